use crate::datastore::{
    postfilters::PostFilters,
    structs::{Micropost, NewMicropost, NewRelationship, NewUser, Relationship, User, UserChanges},
    ConstraintViolation,
};
use crate::twoface::Fallible;
use async_trait::async_trait;
use chrono::offset::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Every table lives behind the same lock, so a cascade delete is atomic like a transaction.
#[derive(Default, Debug)]
struct Tables {
    users: Vec<User>,
    microposts: Vec<Micropost>,
    relationships: Vec<Relationship>,
}

/// A mock implementation of datastore::Client
#[derive(Clone, Default, Debug)]
pub struct Client {
    tables: Arc<Mutex<Tables>>,
}

impl Client {
    /// Replace every micropost, e.g. to control `created_at` in ordering tests.
    pub fn set_microposts(&self, microposts: Vec<Micropost>) {
        self.tables.lock().unwrap().microposts = microposts;
    }

    pub fn relationship_count(&self) -> usize {
        self.tables.lock().unwrap().relationships.len()
    }
}

fn matching_newest_first<'a>(
    microposts: &'a [Micropost],
    filters: &'a PostFilters,
) -> impl Iterator<Item = &'a Micropost> {
    // Newest inserts are at the back, so reversing before a stable sort breaks ties the same way.
    let mut found: Vec<&Micropost> = microposts
        .iter()
        .rev()
        .filter(|p| p.matches(filters))
        .collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    found.into_iter()
}

#[async_trait]
impl super::Client for Client {
    async fn insert_user(&self, new_user: NewUser) -> Fallible<User> {
        let mut tables = self.tables.lock().unwrap();
        let email = new_user.email.to_lowercase();
        if tables.users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(ConstraintViolation::DuplicateEmail(new_user.email).into_error());
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name: new_user.name,
            email: new_user.email,
            password_digest: new_user.password_digest,
            remember_digest: None,
            admin: new_user.admin,
            activation_digest: new_user.activation_digest,
            activated: new_user.activated,
            activated_at: new_user.activated_at,
            reset_digest: None,
            reset_sent_at: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Fallible<Option<User>> {
        let email = email.to_lowercase();
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn users_by_ids(&self, user_ids: Vec<Uuid>) -> Fallible<Vec<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn update_user(&self, user_id: Uuid, changes: UserChanges) -> Fallible<Option<User>> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(email) = &changes.email {
            let email = email.to_lowercase();
            let taken = tables
                .users
                .iter()
                .any(|u| u.id != user_id && u.email.to_lowercase() == email);
            if taken {
                return Err(ConstraintViolation::DuplicateEmail(email).into_error());
            }
        }
        let user = tables.users.iter_mut().find(|u| u.id == user_id);
        guard!(let Some(user) = user else {
            return Ok(None)
        });
        user.apply(changes);
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        let mut tables = self.tables.lock().unwrap();
        let position = tables.users.iter().position(|u| u.id == user_id);
        guard!(let Some(position) = position else {
            return Ok(None)
        });
        tables.microposts.retain(|p| p.user_id != user_id);
        tables.relationships.retain(|r| !r.involves(user_id));
        Ok(Some(tables.users.remove(position)))
    }

    async fn insert_micropost(&self, new_post: NewMicropost) -> Fallible<Micropost> {
        let now = Utc::now();
        let post = Micropost {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            content: new_post.content,
            user_id: new_post.user_id,
        };
        self.tables.lock().unwrap().microposts.push(post.clone());
        Ok(post)
    }

    async fn list_microposts(&self, filters: PostFilters) -> Fallible<Vec<Micropost>> {
        let tables = self.tables.lock().unwrap();
        let results = matching_newest_first(&tables.microposts, &filters)
            .skip(filters.offset as usize)
            .take(filters.limit as usize)
            .cloned()
            .collect();
        Ok(results)
    }

    async fn count_microposts(&self, filters: PostFilters) -> Fallible<u64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .microposts
            .iter()
            .filter(|p| p.matches(&filters))
            .count() as u64)
    }

    async fn delete_micropost(&self, user_id: Uuid, post_id: Uuid) -> Fallible<Option<Micropost>> {
        let mut tables = self.tables.lock().unwrap();
        let position = tables
            .microposts
            .iter()
            .position(|p| p.id == post_id && p.user_id == user_id);
        Ok(position.map(|i| tables.microposts.remove(i)))
    }

    async fn insert_relationship(&self, edge: NewRelationship) -> Fallible<Relationship> {
        let mut tables = self.tables.lock().unwrap();
        let exists = tables
            .relationships
            .iter()
            .any(|r| r.follower_id == edge.follower_id && r.followed_id == edge.followed_id);
        if exists {
            return Err(ConstraintViolation::DuplicateRelationship {
                follower_id: edge.follower_id,
                followed_id: edge.followed_id,
            }
            .into_error());
        }
        let relationship = Relationship {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            follower_id: edge.follower_id,
            followed_id: edge.followed_id,
        };
        tables.relationships.push(relationship.clone());
        Ok(relationship)
    }

    async fn find_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .relationships
            .iter()
            .find(|r| r.follower_id == follower_id && r.followed_id == followed_id)
            .cloned())
    }

    async fn delete_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>> {
        let mut tables = self.tables.lock().unwrap();
        let position = tables
            .relationships
            .iter()
            .position(|r| r.follower_id == follower_id && r.followed_id == followed_id);
        Ok(position.map(|i| tables.relationships.remove(i)))
    }

    async fn following_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .relationships
            .iter()
            .filter(|r| r.follower_id == user_id)
            .map(|r| r.followed_id)
            .collect())
    }

    async fn follower_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .relationships
            .iter()
            .filter(|r| r.followed_id == user_id)
            .map(|r| r.follower_id)
            .collect())
    }
}
