use crate::datastore::{
    postgres::{
        errors::{on_unique_violation, BlockingResp},
        PostgresStore,
    },
    structs::{NewRelationship, Relationship},
    tables::relationships,
    ConstraintViolation,
};
use crate::twoface::{Fallible, TfError};
use actix_threadpool::run as block;
use diesel::{
    query_dsl::{QueryDsl, RunQueryDsl},
    ExpressionMethods, OptionalExtension,
};
use uuid::Uuid;

impl PostgresStore {
    pub async fn insert_relationship(&self, edge: NewRelationship) -> Fallible<Relationship> {
        let conn = self.pool.get()?;
        block(move || {
            diesel::insert_into(relationships::table)
                .values(&edge)
                .get_result::<Relationship>(&conn)
                .map_err(|e| {
                    on_unique_violation(
                        e,
                        ConstraintViolation::DuplicateRelationship {
                            follower_id: edge.follower_id,
                            followed_id: edge.followed_id,
                        },
                    )
                })
        })
        .await
        .to_resp()
    }

    pub async fn find_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>> {
        let conn = self.pool.get()?;
        block(move || {
            let edge: Option<Relationship> = relationships::table
                .filter(relationships::follower_id.eq(follower_id))
                .filter(relationships::followed_id.eq(followed_id))
                .first(&conn)
                .optional()?;
            Ok::<_, TfError>(edge)
        })
        .await
        .to_resp()
    }

    pub async fn delete_relationship(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Fallible<Option<Relationship>> {
        let conn = self.pool.get()?;
        block(move || {
            let target = relationships::table
                .filter(relationships::follower_id.eq(follower_id))
                .filter(relationships::followed_id.eq(followed_id));
            let deleted: Option<Relationship> = diesel::delete(target)
                .get_result(&conn)
                .optional()?;
            Ok::<_, TfError>(deleted)
        })
        .await
        .to_resp()
    }

    pub async fn following_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>> {
        let conn = self.pool.get()?;
        block(move || {
            let ids: Vec<Uuid> = relationships::table
                .filter(relationships::follower_id.eq(user_id))
                .select(relationships::followed_id)
                .load(&conn)?;
            Ok::<_, TfError>(ids)
        })
        .await
        .to_resp()
    }

    pub async fn follower_ids(&self, user_id: Uuid) -> Fallible<Vec<Uuid>> {
        let conn = self.pool.get()?;
        block(move || {
            let ids: Vec<Uuid> = relationships::table
                .filter(relationships::followed_id.eq(user_id))
                .select(relationships::follower_id)
                .load(&conn)?;
            Ok::<_, TfError>(ids)
        })
        .await
        .to_resp()
    }
}
