use crate::credentials::DigestKind;
use crate::datastore::{
    postfilters::PostFilters,
    tables::{microposts, relationships, users},
};
use chrono::{offset::Utc, DateTime, Duration};
use serde::Serialize;
use uuid::Uuid;

/// Password reset links stop working after this long.
pub const RESET_TOKEN_LIFETIME_HOURS: i64 = 2;

/// A user of the website.
#[derive(Queryable, Identifiable, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_digest: Option<String>,
    #[serde(skip_serializing)]
    pub remember_digest: Option<String>,
    pub admin: bool,
    #[serde(skip_serializing)]
    pub activation_digest: Option<String>,
    pub activated: bool,
    pub activated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub reset_digest: Option<String>,
    pub reset_sent_at: Option<DateTime<Utc>>,
}

impl User {
    /// The stored digest for one kind of token, if any.
    pub fn digest(&self, kind: DigestKind) -> Option<&str> {
        match kind {
            DigestKind::Remember => self.remember_digest.as_deref(),
            DigestKind::Activation => self.activation_digest.as_deref(),
            DigestKind::Reset => self.reset_digest.as_deref(),
        }
    }

    /// Was the reset token issued more than two hours before `now` (or never issued)?
    pub fn password_reset_expired(&self, now: DateTime<Utc>) -> bool {
        match self.reset_sent_at {
            Some(sent_at) => sent_at < now - Duration::hours(RESET_TOKEN_LIFETIME_HOURS),
            None => true,
        }
    }

    /// Apply a changeset in memory, the same way the SQL UPDATE would.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(digest) = changes.password_digest {
            self.password_digest = digest;
        }
        if let Some(digest) = changes.remember_digest {
            self.remember_digest = digest;
        }
        if let Some(admin) = changes.admin {
            self.admin = admin;
        }
        if let Some(digest) = changes.activation_digest {
            self.activation_digest = digest;
        }
        if let Some(activated) = changes.activated {
            self.activated = activated;
        }
        if let Some(at) = changes.activated_at {
            self.activated_at = at;
        }
        if let Some(digest) = changes.reset_digest {
            self.reset_digest = digest;
        }
        if let Some(at) = changes.reset_sent_at {
            self.reset_sent_at = at;
        }
        self.updated_at = changes.updated_at;
    }
}

/// Parameters for the database statement which inserts new users. The email must already be
/// normalized and the password already hashed.
#[derive(Insertable, Debug, Clone)]
#[table_name = "users"]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_digest: Option<String>,
    pub activation_digest: Option<String>,
    pub admin: bool,
    pub activated: bool,
    pub activated_at: Option<DateTime<Utc>>,
}

/// Columns to overwrite on an existing user. `None` leaves a column alone; for nullable columns
/// `Some(None)` clears it.
#[derive(AsChangeset, Debug, Clone)]
#[table_name = "users"]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_digest: Option<Option<String>>,
    pub remember_digest: Option<Option<String>>,
    pub admin: Option<bool>,
    pub activation_digest: Option<Option<String>>,
    pub activated: Option<bool>,
    pub activated_at: Option<Option<DateTime<Utc>>>,
    pub reset_digest: Option<Option<String>>,
    pub reset_sent_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserChanges {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            password_digest: None,
            remember_digest: None,
            admin: None,
            activation_digest: None,
            activated: None,
            activated_at: None,
            reset_digest: None,
            reset_sent_at: None,
            updated_at: Utc::now(),
        }
    }
}

impl UserChanges {
    /// Set (or with `None`, clear) one kind of token digest.
    pub fn digest(kind: DigestKind, digest: Option<String>) -> Self {
        let mut changes = Self::default();
        match kind {
            DigestKind::Remember => changes.remember_digest = Some(digest),
            DigestKind::Activation => changes.activation_digest = Some(digest),
            DigestKind::Reset => {
                changes.reset_sent_at = Some(digest.as_ref().map(|_| changes.updated_at));
                changes.reset_digest = Some(digest);
            }
        }
        changes
    }
}

/// A short post from a user.
#[derive(Queryable, Identifiable, Serialize, Clone, Debug, PartialEq, Eq, Hash, Associations)]
#[belongs_to(User)]
pub struct Micropost {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub content: String,
    pub user_id: Uuid,
}

impl Micropost {
    /// Does this micropost match all specified filters? Paging fields aren't considered.
    pub fn matches(&self, filters: &PostFilters) -> bool {
        if let Some(user_ids) = &filters.user_ids {
            if !user_ids.contains(&self.user_id) {
                return false;
            }
        }
        true
    }
}

/// Parameters for the database statement which inserts new microposts.
#[derive(Insertable, Debug, Clone)]
#[table_name = "microposts"]
pub struct NewMicropost {
    pub content: String,
    pub user_id: Uuid,
}

/// A directed follow edge: `follower_id` follows `followed_id`.
#[derive(Queryable, Identifiable, Serialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub follower_id: Uuid,
    pub followed_id: Uuid,
}

impl Relationship {
    /// Does this edge touch the user at either end?
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.follower_id == user_id || self.followed_id == user_id
    }
}

/// Parameters for the database statement which inserts new relationships.
#[derive(Insertable, Debug, Clone, Copy)]
#[table_name = "relationships"]
pub struct NewRelationship {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micropost(user_id: Uuid, content: &str) -> Micropost {
        Micropost {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            content: content.to_owned(),
            user_id,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            name: "Example User".to_owned(),
            email: "user@example.com".to_owned(),
            password_digest: None,
            remember_digest: None,
            admin: false,
            activation_digest: None,
            activated: false,
            activated_at: None,
            reset_digest: None,
            reset_sent_at: None,
        }
    }

    #[test]
    fn test_micropost_filters() {
        let author = Uuid::new_v4();
        let post = micropost(author, "Lorem ipsum");

        assert!(post.matches(&PostFilters::default()));
        assert!(post.matches(&PostFilters::by_user(author)));
        assert!(!post.matches(&PostFilters::by_user(Uuid::new_v4())));
        assert!(!post.matches(&PostFilters {
            user_ids: Some(vec![]),
            ..Default::default()
        }));
        assert!(post.matches(&PostFilters {
            user_ids: Some(vec![Uuid::new_v4(), author]),
            limit: 0,
            offset: 5,
        }));
    }

    #[test]
    fn test_digest_changes_touch_only_their_column() {
        let mut user = user();
        user.apply(UserChanges::digest(DigestKind::Remember, Some("abc".to_owned())));
        assert_eq!(user.digest(DigestKind::Remember), Some("abc"));
        assert_eq!(user.digest(DigestKind::Activation), None);
        assert_eq!(user.digest(DigestKind::Reset), None);

        user.apply(UserChanges::digest(DigestKind::Remember, None));
        assert_eq!(user.digest(DigestKind::Remember), None);
    }

    #[test]
    fn test_reset_digest_stamps_and_clears_sent_at() {
        let mut user = user();
        user.apply(UserChanges::digest(DigestKind::Reset, Some("abc".to_owned())));
        assert!(user.reset_sent_at.is_some());
        user.apply(UserChanges::digest(DigestKind::Reset, None));
        assert!(user.reset_sent_at.is_none());
        assert!(user.reset_digest.is_none());
    }

    #[test]
    fn test_password_reset_expiry() {
        let now = Utc::now();
        let mut user = user();
        assert!(user.password_reset_expired(now));

        user.reset_sent_at = Some(now - Duration::minutes(119));
        assert!(!user.password_reset_expired(now));

        user.reset_sent_at = Some(now - Duration::minutes(121));
        assert!(user.password_reset_expired(now));
    }
}
