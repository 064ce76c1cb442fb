use crate::datastore::{
    postfilters::PostFilters,
    postgres::{errors::BlockingResp, PostgresStore},
    structs::{Micropost, NewMicropost},
    tables::microposts,
};
use crate::twoface::{Fallible, TfError};
use actix_threadpool::run as block;
use diesel::{
    dsl::count_star,
    expression::BoxableExpression,
    pg::Pg,
    query_dsl::{QueryDsl, RunQueryDsl},
    sql_types::Bool,
    ExpressionMethods, OptionalExtension,
};
use uuid::Uuid;

impl PostgresStore {
    pub async fn insert_micropost(&self, new_post: NewMicropost) -> Fallible<Micropost> {
        let conn = self.pool.get()?;
        block(move || {
            let post: Micropost = diesel::insert_into(microposts::table)
                .values(&new_post)
                .get_result(&conn)?;
            Ok::<_, TfError>(post)
        })
        .await
        .to_resp()
    }

    pub async fn list_microposts(&self, filters: PostFilters) -> Fallible<Vec<Micropost>> {
        let conn = self.pool.get()?;
        block(move || {
            let mut query = microposts::table.into_boxed();
            for filter in filters.as_sql_where() {
                query = query.filter(filter);
            }
            let posts: Vec<Micropost> = query
                .order_by((microposts::created_at.desc(), microposts::id.desc()))
                .limit(i64::from(filters.limit))
                .offset(i64::from(filters.offset))
                .load(&conn)?;
            Ok::<_, TfError>(posts)
        })
        .await
        .to_resp()
    }

    pub async fn count_microposts(&self, filters: PostFilters) -> Fallible<u64> {
        let conn = self.pool.get()?;
        block(move || {
            let mut query = microposts::table.select(count_star()).into_boxed();
            for filter in filters.as_sql_where() {
                query = query.filter(filter);
            }
            let count: i64 = query.get_result(&conn)?;
            Ok::<_, TfError>(count as u64)
        })
        .await
        .to_resp()
    }

    pub async fn delete_micropost(&self, user_id: Uuid, id: Uuid) -> Fallible<Option<Micropost>> {
        let conn = self.pool.get()?;
        block(move || {
            // Scoped to the owner, so nobody can delete someone else's micropost.
            let target = microposts::table
                .filter(microposts::id.eq(id))
                .filter(microposts::user_id.eq(user_id));
            let deleted: Option<Micropost> = diesel::delete(target)
                .get_result(&conn)
                .optional()?;
            Ok::<_, TfError>(deleted)
        })
        .await
        .to_resp()
    }
}

impl PostFilters {
    pub fn as_sql_where(
        &self,
    ) -> Vec<Box<dyn BoxableExpression<microposts::table, Pg, SqlType = Bool>>> {
        let mut wheres: Vec<Box<dyn BoxableExpression<microposts::table, Pg, SqlType = Bool>>> =
            Vec::new();
        if let Some(user_ids) = &self.user_ids {
            wheres.push(Box::new(microposts::user_id.eq_any(user_ids.clone())))
        }
        wheres
    }
}
