#[cfg(test)]
pub mod mock;
pub mod postfilters;
pub mod postgres;
pub mod structs;
pub mod tables;

use crate::datastore::structs::{
    Micropost, NewMicropost, NewRelationship, NewUser, Relationship, User, UserChanges,
};
use crate::twoface::{Cause, Describe, ExternalError, Fallible, TfError};
use async_trait::async_trait;
use postfilters::PostFilters;
use thiserror::Error;
use uuid::Uuid;

/// A write that a unique index refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    #[error("a user with email {0:?} already exists")]
    DuplicateEmail(String),
    #[error("{follower_id} already follows {followed_id}")]
    DuplicateRelationship { follower_id: Uuid, followed_id: Uuid },
}

impl ConstraintViolation {
    /// Describe the conflict to callers. A plain `?` would hide it behind a generic server error.
    pub fn into_error(self) -> TfError {
        let text = match self {
            ConstraintViolation::DuplicateEmail(_) => "email has already been taken",
            ConstraintViolation::DuplicateRelationship { .. } => "already following",
        };
        self.describe(ExternalError {
            cause: Cause::UserConflict,
            text,
        })
    }
}

/// If this error came from a unique index, which one?
pub fn constraint_violation(err: &TfError) -> Option<&ConstraintViolation> {
    err.downcast_ref::<ConstraintViolation>()
}

#[async_trait]
/// The interface for storing users, their microposts and who follows whom. Implementations enforce
/// unique emails and unique follow edges themselves, reporting conflicts as `ConstraintViolation`.
pub trait Client: Clone + Send + Sync {
    async fn insert_user(&self, new_user: NewUser) -> Fallible<User>;
    async fn find_user(&self, user_id: Uuid) -> Fallible<Option<User>>;
    /// Case-insensitive.
    async fn find_user_by_email(&self, email: &str) -> Fallible<Option<User>>;
    async fn users_by_ids(&self, user_ids: Vec<Uuid>) -> Fallible<Vec<User>>;
    async fn update_user(&self, user_id: Uuid, changes: UserChanges) -> Fallible<Option<User>>;
    /// Deletes the user, their microposts and every relationship they're part of, all or nothing.
    async fn delete_user(&self, user_id: Uuid) -> Fallible<Option<User>>;

    async fn insert_micropost(&self, new_post: NewMicropost) -> Fallible<Micropost>;
    /// Newest first.
    async fn list_microposts(&self, filters: PostFilters) -> Fallible<Vec<Micropost>>;
    async fn count_microposts(&self, filters: PostFilters) -> Fallible<u64>;
    async fn delete_micropost(&self, user_id: Uuid, post_id: Uuid) -> Fallible<Option<Micropost>>;

    async fn insert_relationship(&self, edge: NewRelationship) -> Fallible<Relationship>;
    async fn find_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>>;
    async fn delete_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>>;
    /// Users that `user_id` follows.
    async fn following_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>>;
    /// Users that follow `user_id`.
    async fn follower_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>>;
}
