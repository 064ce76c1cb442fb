use crate::datastore::{
    postgres::{
        errors::{on_unique_violation, BlockingResp},
        PostgresStore,
    },
    structs::{NewUser, User, UserChanges},
    tables::{microposts, relationships, users},
    ConstraintViolation,
};
use crate::twoface::{Fallible, TfError};
use actix_threadpool::run as block;
use diesel::{
    expression_methods::BoolExpressionMethods,
    query_dsl::{QueryDsl, RunQueryDsl},
    sql_types::Text,
    Connection, ExpressionMethods, OptionalExtension,
};
use uuid::Uuid;

sql_function!(fn lower(x: Text) -> Text);

impl PostgresStore {
    pub async fn insert_user(&self, new_user: NewUser) -> Fallible<User> {
        let conn = self.pool.get()?;
        let email = new_user.email.clone();
        block(move || {
            diesel::insert_into(users::table)
                .values(&new_user)
                .get_result::<User>(&conn)
                .map_err(|e| on_unique_violation(e, ConstraintViolation::DuplicateEmail(email)))
        })
        .await
        .to_resp()
    }

    pub async fn find_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        let conn = self.pool.get()?;
        block(move || {
            let user: Option<User> = users::table.find(user_id).get_result(&conn).optional()?;
            Ok::<_, TfError>(user)
        })
        .await
        .to_resp()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Fallible<Option<User>> {
        let conn = self.pool.get()?;
        let email = email.to_lowercase();
        block(move || {
            let user: Option<User> = users::table
                .filter(lower(users::email).eq(email))
                .first(&conn)
                .optional()?;
            Ok::<_, TfError>(user)
        })
        .await
        .to_resp()
    }

    pub async fn users_by_ids(&self, user_ids: Vec<Uuid>) -> Fallible<Vec<User>> {
        let conn = self.pool.get()?;
        block(move || {
            let found: Vec<User> = users::table
                .filter(users::id.eq_any(user_ids))
                .order_by(users::created_at)
                .load(&conn)?;
            Ok::<_, TfError>(found)
        })
        .await
        .to_resp()
    }

    pub async fn update_user(&self, user_id: Uuid, changes: UserChanges) -> Fallible<Option<User>> {
        let conn = self.pool.get()?;
        block(move || {
            let email = changes.email.clone().unwrap_or_default();
            diesel::update(users::table.find(user_id))
                .set(&changes)
                .get_result::<User>(&conn)
                .optional()
                .map_err(|e| on_unique_violation(e, ConstraintViolation::DuplicateEmail(email)))
        })
        .await
        .to_resp()
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Fallible<Option<User>> {
        let conn = self.pool.get()?;
        block(move || {
            conn.transaction::<_, TfError, _>(|| {
                // Dependents first, so nothing is left pointing at a missing user.
                diesel::delete(microposts::table.filter(microposts::user_id.eq(user_id)))
                    .execute(&conn)?;
                diesel::delete(
                    relationships::table.filter(
                        relationships::follower_id
                            .eq(user_id)
                            .or(relationships::followed_id.eq(user_id)),
                    ),
                )
                .execute(&conn)?;
                let deleted = diesel::delete(users::table.find(user_id))
                    .get_result::<User>(&conn)
                    .optional()?;
                Ok(deleted)
            })
        })
        .await
        .to_resp()
    }
}
