//! Test utilities module for shared test initialization and helpers
//!
//! Every helper hands out its own in-memory SQLite database, so tests do not
//! see each other's rows and identifiers always start at 1.

use std::sync::{Arc, Once};

use crate::storage::{DataStore, SqliteDataStore};
use crate::userdb::UserStore;

/// Load `.env_test` (falling back to `.env`) once per test binary
pub(crate) fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

/// A fresh, empty in-memory data store
pub(crate) fn memory_data_store() -> Arc<dyn DataStore> {
    init_test_environment();
    Arc::new(SqliteDataStore::in_memory().expect("Failed to create in-memory SQLite store"))
}

/// A user store over a freshly migrated in-memory database
pub(crate) async fn migrated_user_store() -> UserStore {
    crate::init_with_store(memory_data_store())
        .await
        .expect("Failed to migrate in-memory SQLite store")
}
