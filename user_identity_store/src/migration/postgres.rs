use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::config::DB_TABLE_MIGRATIONS;

use super::{
    errors::MigrationError,
    types::{AppliedMigration, Migration},
};

pub(super) fn create_users_script_postgres(table: &str, index: &str) -> String {
    format!(
        r#"
        CREATE TABLE {table} (
            id BIGSERIAL PRIMARY KEY,
            internal_id BIGSERIAL NOT NULL,
            one TEXT,
            two TEXT
        );

        CREATE UNIQUE INDEX {index} ON {table} (internal_id);
        "#
    )
}

pub(super) async fn create_ledger_postgres(pool: &Pool<Postgres>) -> Result<(), MigrationError> {
    let table_name = DB_TABLE_MIGRATIONS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            version BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn applied_migrations_postgres(
    pool: &Pool<Postgres>,
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

pub(super) async fn apply_migration_postgres(
    pool: &Pool<Postgres>,
    migration: &Migration,
) -> Result<(), MigrationError> {
    let table_name = DB_TABLE_MIGRATIONS.as_str();
    let failure = |e: sqlx::Error| MigrationError::ApplyFailure {
        version: migration.version,
        name: migration.name.clone(),
        reason: e.to_string(),
    };

    // PostgreSQL DDL is transactional, a failing script leaves nothing behind
    let mut tx = pool.begin().await?;

    sqlx::raw_sql(&migration.postgres)
        .execute(&mut *tx)
        .await
        .map_err(failure)?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (version, name, applied_at) VALUES ($1, $2, $3)
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
