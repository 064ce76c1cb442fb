//! Fill an empty datastore with a sample community: an activated admin, a crowd of activated
//! sample users, microposts for the first few, and a follow graph around the admin.
use crate::accounts::{self, UserForm};
use crate::config::SeedConfig;
use crate::datastore::{
    structs::{User, UserChanges},
    Client,
};
use crate::graph;
use crate::microposts;
use crate::twoface::{reject, Cause, Fallible};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

/// Only the first few users get microposts, so the feed has a mix of busy and quiet authors.
const AUTHORS: usize = 6;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
];

/// What got created.
#[derive(Debug)]
pub struct Seeded {
    pub admin: User,
    pub users: Vec<User>,
    pub microposts: usize,
    pub relationships: usize,
}

fn sentence<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(5..=10);
    let words: Vec<&str> = (0..len)
        .filter_map(|_| WORDS.choose(&mut *rng).copied())
        .collect();
    format!("{}.", words.join(" "))
}

async fn activated_user<DS: Client>(ds: &DS, form: UserForm) -> Fallible<User> {
    let registration = accounts::register(ds, form).await?;
    accounts::activate(ds, &registration.user, &registration.activation_token).await
}

pub async fn run<DS: Client>(ds: &DS, config: &SeedConfig) -> Fallible<Seeded> {
    let admin = activated_user(
        ds,
        UserForm::new("Example User", "example@railstutorial.org", &config.password),
    )
    .await?;
    let changes = UserChanges {
        admin: Some(true),
        ..Default::default()
    };
    guard!(let Some(admin) = ds.update_user(admin.id, changes).await? else {
        return Err(reject(Cause::NotFound, "admin vanished while seeding"))
    });

    let mut users = vec![admin.clone()];
    for n in 1..=config.sample_users {
        let form = UserForm::new(
            &format!("Sample User {}", n),
            &format!("example-{}@railstutorial.org", n),
            &config.password,
        );
        users.push(activated_user(ds, form).await?);
    }
    info!(users = users.len(), "seeded users");

    let mut microposts = 0;
    for _ in 0..config.posts_per_user {
        for author in users.iter().take(AUTHORS) {
            let content = sentence(&mut rand::thread_rng());
            microposts::post(ds, author, &content).await?;
            microposts += 1;
        }
    }
    info!(microposts, "seeded microposts");

    // The admin follows users 3..=50 and is followed by users 4..=40 (1-based).
    let mut relationships = 0;
    for followed in users.iter().skip(2).take(48) {
        graph::follow(ds, &admin, followed).await?;
        relationships += 1;
    }
    for follower in users.iter().skip(3).take(37) {
        graph::follow(ds, follower, &admin).await?;
        relationships += 1;
    }
    info!(relationships, "seeded relationships");

    Ok(Seeded {
        admin,
        users,
        microposts,
        relationships,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::mock;
    use crate::feed::feed;

    #[test]
    fn test_sentences_fit_in_a_micropost() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let s = sentence(&mut rng);
            assert!(s.ends_with('.'));
            assert!(s.len() <= crate::validation::MICROPOST_MAX_LEN);
        }
    }

    #[actix_rt::test]
    async fn test_seeds_a_small_community() {
        let ds = mock::Client::default();
        let config = SeedConfig {
            sample_users: 10,
            posts_per_user: 2,
            password: "password".to_owned(),
        };
        let seeded = run(&ds, &config).await.unwrap();

        assert!(seeded.admin.admin);
        assert_eq!(seeded.users.len(), 11);
        assert!(seeded.users.iter().all(|u| u.activated));
        assert_eq!(seeded.microposts, 12);
        // Fewer users than the full graph asks for, so it's cut short: 2..=10 and 3..=10 (0-based).
        assert_eq!(seeded.relationships, 9 + 8);
        assert_eq!(ds.relationship_count(), 17);

        let admins_feed = feed(&ds, &seeded.admin, 0, 100).await.unwrap();
        let authors: Vec<_> = seeded.users.iter().take(AUTHORS).map(|u| u.id).collect();
        // Of the six authors, the admin follows the 3rd to 6th and also sees their own posts.
        assert_eq!(admins_feed.len(), 2 * 5);
        assert!(admins_feed.iter().all(|p| authors.contains(&p.user_id)));
        assert!(admins_feed.iter().all(|p| p.user_id != seeded.users[1].id));
    }
}
