#[allow(unused_imports)]
use diesel::sql_types::*;

table! {
    users (id) {
        id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        name -> Text,
        email -> Text,
        password_digest -> Nullable<Text>,
        remember_digest -> Nullable<Text>,
        admin -> Bool,
        activation_digest -> Nullable<Text>,
        activated -> Bool,
        activated_at -> Nullable<Timestamptz>,
        reset_digest -> Nullable<Text>,
        reset_sent_at -> Nullable<Timestamptz>,
    }
}

table! {
    microposts (id) {
        id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        content -> Text,
        user_id -> Uuid,
    }
}

table! {
    relationships (id) {
        id -> Uuid,
        created_at -> Timestamptz,
        follower_id -> Uuid,
        followed_id -> Uuid,
    }
}

joinable!(microposts -> users (user_id));
allow_tables_to_appear_in_same_query!(microposts, users);
allow_tables_to_appear_in_same_query!(relationships, users);
