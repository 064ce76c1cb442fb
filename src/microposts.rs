//! Microposts: short, bounded-length posts owned by a single user.
use crate::datastore::{
    postfilters::PostFilters,
    structs::{Micropost, NewMicropost, User},
    Client,
};
use crate::metrics::observe;
use crate::twoface::Fallible;
use crate::validation::{check_max_len, check_present, ValidationErrors, MICROPOST_MAX_LEN};
use tracing::{debug, info};
use uuid::Uuid;

/// A micropost that hasn't been saved yet.
#[derive(Debug, Clone, Default)]
pub struct MicropostForm {
    pub user_id: Option<Uuid>,
    pub content: String,
}

impl MicropostForm {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        if self.user_id.is_none() {
            errors.add("user_id", "can't be blank");
        }
        check_present(&mut errors, "content", &self.content);
        check_max_len(&mut errors, "content", &self.content, MICROPOST_MAX_LEN);
        errors
    }
}

/// Validate and save a micropost.
pub async fn create<DS: Client>(ds: &DS, form: MicropostForm) -> Fallible<Micropost> {
    observe("create_micropost", || async {
        let errors = form.validate();
        let user_id = match form.user_id {
            Some(user_id) if errors.is_empty() => user_id,
            _ => return Err(errors.into_error()),
        };
        let post = ds
            .insert_micropost(NewMicropost {
                content: form.content,
                user_id,
            })
            .await?;
        info!(user_id = %user_id, post_id = %post.id, "created micropost");
        Ok(post)
    })
    .await
}

/// Shorthand for the common case: `author` posts `content`.
pub async fn post<DS: Client>(ds: &DS, author: &User, content: &str) -> Fallible<Micropost> {
    create(
        ds,
        MicropostForm {
            user_id: Some(author.id),
            content: content.to_owned(),
        },
    )
    .await
}

/// Delete one of `author`'s microposts. Someone else's micropost is left alone and `None` returned.
pub async fn delete<DS: Client>(
    ds: &DS,
    author: &User,
    post_id: Uuid,
) -> Fallible<Option<Micropost>> {
    observe("delete_micropost", || async {
        let deleted = ds.delete_micropost(author.id, post_id).await?;
        if deleted.is_none() {
            debug!(user_id = %author.id, post_id = %post_id, "no such micropost to delete");
        }
        Ok(deleted)
    })
    .await
}

/// The author's own microposts, newest first.
pub async fn of_user<DS: Client>(ds: &DS, author: &User, limit: u32) -> Fallible<Vec<Micropost>> {
    ds.list_microposts(PostFilters {
        limit,
        ..PostFilters::by_user(author.id)
    })
    .await
}

/// How many microposts the author has written.
pub async fn count<DS: Client>(ds: &DS, author: &User) -> Fallible<u64> {
    ds.count_microposts(PostFilters::by_user(author.id)).await
}
