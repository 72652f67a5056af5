//! user_identity_store - Persistent users table with two independent identifiers
//!
//! Every user row carries a primary key (`id`) and a separately issued
//! `internal_id`, each drawn from its own counter and each unique. The crate
//! provides the schema migrations that create the table on SQLite or
//! PostgreSQL and the data-access layer that reads and writes it.

mod config;
mod migration;
mod patch;
mod storage;
mod userdb;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

pub use migration::{AppliedMigration, Migration, MigrationError, Migrator, user_migrations};
pub use patch::Patch;
pub use storage::{
    DataStore, PostgresDataStore, SqliteDataStore, StorageError, StoreConfig, StoreType,
};
pub use userdb::{NewUser, User, UserError, UserPatch, UserSearchField, UserStore};

/// Connect to the data store named by `GENERIC_DATA_STORE_TYPE` and
/// `GENERIC_DATA_STORE_URL`, apply pending migrations and return the user store.
pub async fn init() -> Result<UserStore, Box<dyn std::error::Error>> {
    let store = StoreConfig::from_env()?.connect()?;
    Ok(init_with_store(store).await?)
}

/// Apply pending migrations to `store`, check the resulting schema and
/// return the user store on top of it.
pub async fn init_with_store(store: Arc<dyn DataStore>) -> Result<UserStore, MigrationError> {
    let migrator = Migrator::new(store.clone());
    migrator.run().await?;
    migrator.validate_schema().await?;

    Ok(UserStore::new(store))
}
