use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::config::DB_TABLE_MIGRATIONS;

use super::{
    errors::MigrationError,
    types::{AppliedMigration, Migration},
};

/// SQLite allows a single AUTOINCREMENT column per table, so `internal_id`
/// draws from a one-row counter table instead.
pub(super) fn create_users_script_sqlite(table: &str, index: &str, seq: &str) -> String {
    format!(
        r#"
        CREATE TABLE {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            internal_id INTEGER NOT NULL,
            one TEXT,
            two TEXT
        );

        CREATE UNIQUE INDEX {index} ON {table} (internal_id);

        CREATE TABLE {seq} (
            value INTEGER NOT NULL
        );

        INSERT INTO {seq} (value) VALUES (0);
        "#
    )
}

pub(super) async fn create_ledger_sqlite(pool: &Pool<Sqlite>) -> Result<(), MigrationError> {
    let table_name = DB_TABLE_MIGRATIONS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn applied_migrations_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<Vec<AppliedMigration>, MigrationError> {
    let table_name = DB_TABLE_MIGRATIONS.as_str();

    let applied = sqlx::query_as::<_, AppliedMigration>(&format!(
        r#"
        SELECT version, name, applied_at FROM {table_name} ORDER BY version ASC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(applied)
}

pub(super) async fn apply_migration_sqlite(
    pool: &Pool<Sqlite>,
    migration: &Migration,
) -> Result<(), MigrationError> {
    let table_name = DB_TABLE_MIGRATIONS.as_str();
    let failure = |e: sqlx::Error| MigrationError::ApplyFailure {
        version: migration.version,
        name: migration.name.clone(),
        reason: e.to_string(),
    };

    let mut tx = pool.begin().await?;

    sqlx::raw_sql(&migration.sqlite)
        .execute(&mut *tx)
        .await
        .map_err(failure)?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (version, name, applied_at) VALUES (?, ?, ?)
        "#
    ))
    .bind(migration.version)
    .bind(&migration.name)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await
    .map_err(failure)?;

    tx.commit().await.map_err(failure)
}
