use sqlx::{Pool, Postgres};

use crate::config::DB_TABLE_USERS;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, User, UserPatch, UserSearchField},
};

// PostgreSQL implementations
pub(super) async fn get_all_users_postgres(pool: &Pool<Postgres>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} ORDER BY id ASC
        "#
    ))
    .fetch_all(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn get_user_by_field_postgres(
    pool: &Pool<Postgres>,
    field: &UserSearchField,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    match field {
        UserSearchField::Id(id) => sqlx::query_as::<_, User>(&format!(
            r#"
                SELECT * FROM {table_name} WHERE id = $1
                "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(UserError::from),
        UserSearchField::InternalId(internal_id) => sqlx::query_as::<_, User>(&format!(
            r#"
                SELECT * FROM {table_name} WHERE internal_id = $1
                "#
        ))
        .bind(internal_id)
        .fetch_optional(pool)
        .await
        .map_err(UserError::from),
    }
}

/// Both identifiers are BIGSERIAL columns, each backed by its own sequence
pub(super) async fn create_user_postgres(
    pool: &Pool<Postgres>,
    new_user: &NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (one, two)
        VALUES ($1, $2)
        RETURNING *
        "#
    ))
    .bind(&new_user.one)
    .bind(&new_user.two)
    .fetch_one(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn insert_user_with_internal_id_postgres(
    pool: &Pool<Postgres>,
    internal_id: i64,
    new_user: &NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (internal_id, one, two)
        VALUES ($1, $2, $3)
        RETURNING *
        "#
    ))
    .bind(internal_id)
    .bind(&new_user.one)
    .bind(&new_user.two)
    .fetch_one(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn update_user_postgres(
    pool: &Pool<Postgres>,
    id: i64,
    patch: &UserPatch,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name} SET
            one = CASE WHEN $1 THEN $2 ELSE one END,
            two = CASE WHEN $3 THEN $4 ELSE two END
        WHERE id = $5
        RETURNING *
        "#
    ))
    .bind(!patch.one.is_missing())
    .bind(patch.one.as_value())
    .bind(!patch.two.is_missing())
    .bind(patch.two.as_value())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn upsert_user_by_internal_id_postgres(
    pool: &Pool<Postgres>,
    internal_id: i64,
    patch: &UserPatch,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (internal_id, one, two)
        VALUES ($1, $2, $3)
        ON CONFLICT (internal_id) DO UPDATE SET
            one = CASE WHEN $4 THEN EXCLUDED.one ELSE {table_name}.one END,
            two = CASE WHEN $5 THEN EXCLUDED.two ELSE {table_name}.two END
        RETURNING *
        "#
    ))
    .bind(internal_id)
    .bind(patch.one.as_value())
    .bind(patch.two.as_value())
    .bind(!patch.one.is_missing())
    .bind(!patch.two.is_missing())
    .fetch_one(pool)
    .await
    .map_err(UserError::from)
}

pub(super) async fn delete_user_postgres(pool: &Pool<Postgres>, id: i64) -> Result<bool, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
