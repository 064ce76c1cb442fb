mod errors;
pub mod micropost_store;
pub mod relationship_store;
pub mod user_store;

use crate::config::Config;
use crate::datastore::{
    postfilters::PostFilters,
    structs::{Micropost, NewMicropost, NewRelationship, NewUser, Relationship, User, UserChanges},
    Client,
};
use crate::twoface::Fallible;
use async_trait::async_trait;
use diesel::{
    pg::PgConnection,
    r2d2::{ConnectionManager, Pool},
};
use prometheus::{
    core::{Collector, Desc},
    proto::MetricFamily,
    IntGauge, Opts,
};
use std::time::Duration;
use uuid::Uuid;

pub struct Dsn {
    secret: String,
}

impl Dsn {
    pub fn new(config: &Config) -> Self {
        Dsn {
            secret: config.db_dsn.clone(),
        }
    }
}

impl From<Dsn> for String {
    fn from(dsn: Dsn) -> String {
        dsn.secret
    }
}

/// An implementation of datastore::Client backed by Postgres. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool<ConnectionManager<PgConnection>>,
    idle_conns: IntGauge,
    conns: IntGauge,
}

impl PostgresStore {
    pub fn new(
        dsn: Dsn,
        max_pool_size: u32,
        conn_timeout: Duration,
    ) -> Result<Self, anyhow::Error> {
        let manager = ConnectionManager::<PgConnection>::new(dsn);
        let pool = Pool::builder()
            .max_size(max_pool_size)
            .connection_timeout(conn_timeout)
            .build(manager)?;
        let idle_conns = IntGauge::with_opts(Opts::new(
            "microblog_db_connections_idle",
            "How many DB connections are currently idle",
        ))?;
        let conns = IntGauge::with_opts(Opts::new(
            "microblog_db_connections",
            "How many DB connections are open",
        ))?;
        Ok(Self {
            pool,
            idle_conns,
            conns,
        })
    }
}

impl Collector for PostgresStore {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.idle_conns.desc();
        descs.extend(self.conns.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.idle_conns
            .set(self.pool.state().idle_connections as i64);
        self.conns.set(self.pool.state().connections as i64);
        let mut metrics = self.idle_conns.collect();
        metrics.extend(self.conns.collect());
        metrics
    }
}

// The queries themselves live in the *_store modules, one per table.
#[async_trait]
impl Client for PostgresStore {
    async fn insert_user(&self, new_user: NewUser) -> Fallible<User> {
        PostgresStore::insert_user(self, new_user).await
    }
    async fn find_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        PostgresStore::find_user(self, user_id).await
    }
    async fn find_user_by_email(&self, email: &str) -> Fallible<Option<User>> {
        PostgresStore::find_user_by_email(self, email).await
    }
    async fn users_by_ids(&self, user_ids: Vec<Uuid>) -> Fallible<Vec<User>> {
        PostgresStore::users_by_ids(self, user_ids).await
    }
    async fn update_user(&self, user_id: Uuid, changes: UserChanges) -> Fallible<Option<User>> {
        PostgresStore::update_user(self, user_id, changes).await
    }
    async fn delete_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        PostgresStore::delete_user(self, user_id).await
    }

    async fn insert_micropost(&self, new_post: NewMicropost) -> Fallible<Micropost> {
        PostgresStore::insert_micropost(self, new_post).await
    }
    async fn list_microposts(&self, filters: PostFilters) -> Fallible<Vec<Micropost>> {
        PostgresStore::list_microposts(self, filters).await
    }
    async fn count_microposts(&self, filters: PostFilters) -> Fallible<u64> {
        PostgresStore::count_microposts(self, filters).await
    }
    async fn delete_micropost(&self, user_id: Uuid, post_id: Uuid) -> Fallible<Option<Micropost>> {
        PostgresStore::delete_micropost(self, user_id, post_id).await
    }

    async fn insert_relationship(&self, edge: NewRelationship) -> Fallible<Relationship> {
        PostgresStore::insert_relationship(self, edge).await
    }
    async fn find_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>> {
        PostgresStore::find_relationship(self, follower_id, followed_id).await
    }
    async fn delete_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>> {
        PostgresStore::delete_relationship(self, follower_id, followed_id).await
    }
    async fn following_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>> {
        PostgresStore::following_ids(self, user_id).await
    }
    async fn follower_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>> {
        PostgresStore::follower_ids(self, user_id).await
    }
}
