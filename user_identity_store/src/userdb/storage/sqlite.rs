use sqlx::{Pool, Sqlite};

use crate::config::{DB_TABLE_USERS, users_internal_id_seq};
use crate::userdb::{
    errors::UserError,
    types::{NewUser, User, UserPatch, UserSearchField},
};

// SQLite implementations
pub(super) async fn get_all_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
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

pub(super) async fn get_user_by_field_sqlite(
    pool: &Pool<Sqlite>,
    field: &UserSearchField,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    match field {
        UserSearchField::Id(id) => sqlx::query_as::<_, User>(&format!(
            r#"
                SELECT * FROM {table_name} WHERE id = ?
                "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(UserError::from),
        UserSearchField::InternalId(internal_id) => sqlx::query_as::<_, User>(&format!(
            r#"
                SELECT * FROM {table_name} WHERE internal_id = ?
                "#
        ))
        .bind(internal_id)
        .fetch_optional(pool)
        .await
        .map_err(UserError::from),
    }
}

/// `id` comes from AUTOINCREMENT, `internal_id` from the counter table. The
/// counter update takes the write lock, so both values are issued under the
/// same transaction and concurrent creators are serialized by SQLite.
pub(super) async fn create_user_sqlite(
    pool: &Pool<Sqlite>,
    new_user: &NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let seq_name = users_internal_id_seq();

    let mut tx = pool.begin().await?;

    let internal_id: i64 = sqlx::query_scalar(&format!(
        r#"
        UPDATE {seq_name} SET value = value + 1 RETURNING value
        "#
    ))
    .fetch_one(&mut *tx)
    .await?;

    let inserted = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (internal_id, one, two)
        VALUES (?, ?, ?)
        RETURNING *
        "#
    ))
    .bind(internal_id)
    .bind(&new_user.one)
    .bind(&new_user.two)
    .fetch_one(&mut *tx)
    .await;

    // A failed INSERT only aborts its own statement. The counter step is
    // committed either way, like a PostgreSQL nextval, so a collision with an
    // explicitly inserted internal_id does not repeat on the next create.
    tx.commit().await?;

    inserted.map_err(UserError::from)
}

pub(super) async fn insert_user_with_internal_id_sqlite(
    pool: &Pool<Sqlite>,
    internal_id: i64,
    new_user: &NewUser,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (internal_id, one, two)
        VALUES (?, ?, ?)
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

pub(super) async fn update_user_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
    patch: &UserPatch,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name} SET
            one = CASE WHEN ? THEN ? ELSE one END,
            two = CASE WHEN ? THEN ? ELSE two END
        WHERE id = ?
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

/// Single statement, so a concurrent caller cannot slip in between the
/// existence check and the insert.
pub(super) async fn upsert_user_by_internal_id_sqlite(
    pool: &Pool<Sqlite>,
    internal_id: i64,
    patch: &UserPatch,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (internal_id, one, two)
        VALUES (?, ?, ?)
        ON CONFLICT (internal_id) DO UPDATE SET
            one = CASE WHEN ? THEN excluded.one ELSE {table_name}.one END,
            two = CASE WHEN ? THEN excluded.two ELSE {table_name}.two END
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

pub(super) async fn delete_user_sqlite(pool: &Pool<Sqlite>, id: i64) -> Result<bool, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
