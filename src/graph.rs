//! Who follows whom. Edges are directed: `a` following `b` says nothing about `b` following `a`.
//! Both directions are answered from the same edge set, so `is_following(a, b)` and
//! `followers(b).contains(a)` always agree.
use crate::datastore::{
    constraint_violation,
    structs::{NewRelationship, User},
    Client, ConstraintViolation,
};
use crate::metrics::observe;
use crate::twoface::{reject, Cause, Fallible, TfError};
use tracing::{debug, info, warn};

/// Make `follower` follow `followed`. Already following is fine and changes nothing.
pub async fn follow<DS: Client>(ds: &DS, follower: &User, followed: &User) -> Fallible<()> {
    observe("follow", || async {
        if follower.id == followed.id {
            warn!(user_id = %follower.id, "rejected self-follow");
            return Err(reject(Cause::UserActionInvalid, "users can't follow themselves"));
        }
        let edge = NewRelationship {
            follower_id: follower.id,
            followed_id: followed.id,
        };
        match ds.insert_relationship(edge).await {
            Ok(_) => {
                info!(follower_id = %follower.id, followed_id = %followed.id, "followed");
                Ok(())
            }
            // Lost a race with another follow of the same pair. The edge exists either way.
            Err(e) if already_following(&e) => {
                debug!(follower_id = %follower.id, followed_id = %followed.id, "already following");
                Ok(())
            }
            Err(e) => Err(e),
        }
    })
    .await
}

fn already_following(err: &TfError) -> bool {
    matches!(
        constraint_violation(err),
        Some(ConstraintViolation::DuplicateRelationship { .. })
    )
}

/// Stop `follower` following `followed`. Not following is fine and changes nothing.
pub async fn unfollow<DS: Client>(ds: &DS, follower: &User, followed: &User) -> Fallible<()> {
    observe("unfollow", || async {
        let removed = ds.delete_relationship(follower.id, followed.id).await?;
        if removed.is_some() {
            info!(follower_id = %follower.id, followed_id = %followed.id, "unfollowed");
        }
        Ok(())
    })
    .await
}

/// Does `follower` currently follow `followed`?
pub async fn is_following<DS: Client>(
    ds: &DS,
    follower: &User,
    followed: &User,
) -> Fallible<bool> {
    Ok(ds
        .find_relationship(follower.id, followed.id)
        .await?
        .is_some())
}

/// Everyone `user` follows.
pub async fn following<DS: Client>(ds: &DS, user: &User) -> Fallible<Vec<User>> {
    let ids = ds.following_ids(user.id).await?;
    ds.users_by_ids(ids).await
}

/// Everyone who follows `user`.
pub async fn followers<DS: Client>(ds: &DS, user: &User) -> Fallible<Vec<User>> {
    let ids = ds.follower_ids(user.id).await?;
    ds.users_by_ids(ids).await
}
