use std::{collections::HashSet, sync::Arc};

use crate::config::{
    DB_TABLE_MIGRATIONS, DB_TABLE_USERS, users_internal_id_index, users_internal_id_seq,
    validate_identifier, validate_users_table,
};
use crate::storage::{
    DataStore, validate_postgres_table_schema, validate_postgres_unique_index,
    validate_sqlite_table_schema, validate_sqlite_unique_index,
};

use super::postgres::*;
use super::sqlite::*;
use super::{
    errors::MigrationError,
    types::{AppliedMigration, Migration, user_migrations},
};

/// Applies an ordered list of migrations to one data store, recording each
/// applied version in a ledger table.
#[derive(Clone, Debug)]
pub struct Migrator {
    store: Arc<dyn DataStore>,
    migrations: Vec<Migration>,
}

impl Migrator {
    /// Migrator for the user identity schema
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self::with_migrations(store, user_migrations())
    }

    pub fn with_migrations(store: Arc<dyn DataStore>, migrations: Vec<Migration>) -> Self {
        Self { store, migrations }
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Apply every migration not yet in the ledger, in version order.
    ///
    /// Returns the versions applied by this call. The first failing migration
    /// aborts the run; migrations after it are not attempted.
    #[tracing::instrument(skip(self), fields(migrations = self.migrations.len()))]
    pub async fn run(&self) -> Result<Vec<i64>, MigrationError> {
        check_order(&self.migrations)?;
        validate_identifier(&DB_TABLE_MIGRATIONS).map_err(MigrationError::Storage)?;
        validate_users_table(&DB_TABLE_USERS).map_err(MigrationError::Storage)?;
        self.create_ledger().await?;

        let applied: HashSet<i64> = self
            .applied_versions()
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        let mut newly_applied = Vec::new();
        for migration in &self.migrations {
            if applied.contains(&migration.version) {
                tracing::debug!(version = migration.version, name = %migration.name, "Migration already applied");
                continue;
            }

            self.apply(migration).await?;
            newly_applied.push(migration.version);
        }

        tracing::info!(applied = ?newly_applied, "Database migrations complete");
        Ok(newly_applied)
    }

    /// Apply one migration without consulting the ledger.
    ///
    /// Scripts do not guard against existing objects, so applying a migration
    /// twice fails with [`MigrationError::ApplyFailure`].
    #[tracing::instrument(skip(self, migration), fields(version = migration.version, name = %migration.name))]
    pub async fn apply(&self, migration: &Migration) -> Result<(), MigrationError> {
        self.create_ledger().await?;

        let result = if let Some(pool) = self.store.as_sqlite() {
            apply_migration_sqlite(pool, migration).await
        } else if let Some(pool) = self.store.as_postgres() {
            apply_migration_postgres(pool, migration).await
        } else {
            Err(MigrationError::Storage(
                "Unsupported database type".to_string(),
            ))
        };

        match &result {
            Ok(()) => tracing::info!("Migration applied"),
            Err(e) => tracing::error!(error = %e, "Migration failed"),
        }

        result
    }

    /// Ledger entries, oldest first
    pub async fn applied_versions(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        self.create_ledger().await?;

        if let Some(pool) = self.store.as_sqlite() {
            applied_migrations_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            applied_migrations_postgres(pool).await
        } else {
            Err(MigrationError::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }

    /// Validates that the users table and its unique `internal_id` index match what we expect
    pub async fn validate_schema(&self) -> Result<(), MigrationError> {
        let users_table = DB_TABLE_USERS.as_str();
        let index = users_internal_id_index();

        if let Some(pool) = self.store.as_sqlite() {
            let expected_columns = [
                ("id", "INTEGER"),
                ("internal_id", "INTEGER"),
                ("one", "TEXT"),
                ("two", "TEXT"),
            ];
            validate_sqlite_table_schema(
                pool,
                users_table,
                &expected_columns,
                MigrationError::SchemaMismatch,
            )
            .await?;
            validate_sqlite_table_schema(
                pool,
                &users_internal_id_seq(),
                &[("value", "INTEGER")],
                MigrationError::SchemaMismatch,
            )
            .await?;
            validate_sqlite_unique_index(
                pool,
                users_table,
                &index,
                "internal_id",
                MigrationError::SchemaMismatch,
            )
            .await
        } else if let Some(pool) = self.store.as_postgres() {
            let expected_columns = [
                ("id", "bigint"),
                ("internal_id", "bigint"),
                ("one", "text"),
                ("two", "text"),
            ];
            validate_postgres_table_schema(
                pool,
                users_table,
                &expected_columns,
                MigrationError::SchemaMismatch,
            )
            .await?;
            validate_postgres_unique_index(
                pool,
                users_table,
                &index,
                "internal_id",
                MigrationError::SchemaMismatch,
            )
            .await
        } else {
            Err(MigrationError::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }

    async fn create_ledger(&self) -> Result<(), MigrationError> {
        if let Some(pool) = self.store.as_sqlite() {
            create_ledger_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_ledger_postgres(pool).await
        } else {
            Err(MigrationError::Storage(
                "Unsupported database type".to_string(),
            ))
        }
    }
}

fn check_order(migrations: &[Migration]) -> Result<(), MigrationError> {
    for pair in migrations.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(MigrationError::OutOfOrder {
                previous: pair[0].version,
                next: pair[1].version,
            });
        }
    }
    Ok(())
}
