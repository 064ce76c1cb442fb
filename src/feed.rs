//! A user's feed: their own microposts plus those of everyone they follow, newest first.
//! Only direct follows count; people followed by the people you follow don't show up.
use crate::datastore::{
    postfilters::PostFilters,
    structs::{Micropost, User},
    Client,
};
use crate::metrics::observe;
use crate::twoface::Fallible;
use tracing::debug;
use uuid::Uuid;

/// The user plus everyone they follow.
pub async fn relevant_authors<DS: Client>(ds: &DS, user: &User) -> Fallible<Vec<Uuid>> {
    let mut authors = ds.following_ids(user.id).await?;
    authors.push(user.id);
    Ok(authors)
}

/// One page of the user's feed. `page` starts at 0.
pub async fn feed<DS: Client>(
    ds: &DS,
    user: &User,
    page: u32,
    per_page: u32,
) -> Fallible<Vec<Micropost>> {
    observe("feed", || async {
        let authors = relevant_authors(ds, user).await?;
        debug!(user_id = %user.id, authors = authors.len(), page, "loading feed");
        ds.list_microposts(PostFilters {
            user_ids: Some(authors),
            limit: per_page,
            offset: page.saturating_mul(per_page),
            ..Default::default()
        })
        .await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{register, UserForm};
    use crate::datastore::mock;
    use crate::graph::{follow, unfollow};
    use crate::microposts::post;
    use chrono::{offset::Utc, Duration};

    async fn user(ds: &mock::Client, name: &str) -> User {
        let email = format!("{}@example.com", name);
        register(ds, UserForm::new(name, &email, "password"))
            .await
            .unwrap()
            .user
    }

    #[actix_rt::test]
    async fn test_feed_should_have_the_right_posts() {
        let ds = mock::Client::default();
        let akari = user(&ds, "akari").await;
        let mimimi = user(&ds, "mimimi").await;
        let lana = user(&ds, "lana").await;
        follow(&ds, &akari, &lana).await.unwrap();

        let from_followed = post(&ds, &lana, "lana's post").await.unwrap();
        let from_self = post(&ds, &akari, "akari's post").await.unwrap();
        let from_unfollowed = post(&ds, &mimimi, "mimimi's post").await.unwrap();

        let akaris_feed = feed(&ds, &akari, 0, 30).await.unwrap();
        assert!(akaris_feed.contains(&from_followed));
        assert!(akaris_feed.contains(&from_self));
        assert!(!akaris_feed.contains(&from_unfollowed));
    }

    #[actix_rt::test]
    async fn test_feed_is_not_transitive() {
        let ds = mock::Client::default();
        let akari = user(&ds, "akari").await;
        let mimimi = user(&ds, "mimimi").await;
        let lana = user(&ds, "lana").await;
        follow(&ds, &akari, &lana).await.unwrap();
        follow(&ds, &lana, &mimimi).await.unwrap();
        let friend_of_friend = post(&ds, &mimimi, "two hops away").await.unwrap();

        assert!(!feed(&ds, &akari, 0, 30).await.unwrap().contains(&friend_of_friend));
        assert!(feed(&ds, &lana, 0, 30).await.unwrap().contains(&friend_of_friend));
    }

    #[actix_rt::test]
    async fn test_unfollowing_removes_posts_from_the_feed() {
        let ds = mock::Client::default();
        let akari = user(&ds, "akari").await;
        let lana = user(&ds, "lana").await;
        follow(&ds, &akari, &lana).await.unwrap();
        let p = post(&ds, &lana, "hello").await.unwrap();
        assert!(feed(&ds, &akari, 0, 30).await.unwrap().contains(&p));

        unfollow(&ds, &akari, &lana).await.unwrap();
        assert!(feed(&ds, &akari, 0, 30).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_feed_is_newest_first_and_paged() {
        let ds = mock::Client::default();
        let akari = user(&ds, "akari").await;
        let lana = user(&ds, "lana").await;
        follow(&ds, &akari, &lana).await.unwrap();

        let now = Utc::now();
        let written = |author: &User, content: &str, minutes_ago: i64| Micropost {
            id: Uuid::new_v4(),
            created_at: now - Duration::minutes(minutes_ago),
            updated_at: now - Duration::minutes(minutes_ago),
            content: content.to_owned(),
            user_id: author.id,
        };
        let oldest = written(&lana, "oldest", 30);
        let middle = written(&akari, "middle", 20);
        let newest = written(&lana, "newest", 10);
        ds.set_microposts(vec![middle.clone(), newest.clone(), oldest.clone()]);

        let first_page = feed(&ds, &akari, 0, 2).await.unwrap();
        assert_eq!(first_page, vec![newest, middle]);
        let second_page = feed(&ds, &akari, 1, 2).await.unwrap();
        assert_eq!(second_page, vec![oldest]);
    }
}
