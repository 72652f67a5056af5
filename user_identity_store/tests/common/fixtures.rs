use std::{env, sync::Arc};

use tempfile::TempDir;
use user_identity_store::{DataStore, NewUser, SqliteDataStore, UserStore, init_with_store};

/// A private, empty in-memory database
pub fn memory_store() -> Arc<dyn DataStore> {
    Arc::new(SqliteDataStore::in_memory().expect("Failed to create in-memory SQLite store"))
}

/// A user store over a freshly migrated database
pub async fn fresh_user_store() -> UserStore {
    init_with_store(memory_store())
        .await
        .expect("Failed to migrate in-memory SQLite store")
}

pub fn new_user(one: &str, two: Option<&str>) -> NewUser {
    NewUser::new(Some(one), two)
}

/// A user store over a freshly migrated file database in WAL mode, served by
/// a multi-connection pool. The database lives as long as the returned directory.
pub async fn file_user_store() -> (TempDir, UserStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite:{}", dir.path().join("users.db").display());
    let store = SqliteDataStore::connect_lazy(&url).expect("Failed to create file SQLite store");
    let user_store = init_with_store(Arc::new(store))
        .await
        .expect("Failed to migrate file SQLite store");
    (dir, user_store)
}

/// Sets an environment variable and restores its previous value on drop
pub struct EnvVarGuard {
    key: String,
    original_value: Option<String>,
}

impl EnvVarGuard {
    pub fn set(key: &str, value: &str) -> Self {
        let original_value = env::var(key).ok();
        // Use unsafe block for env var manipulation as it affects global state
        unsafe {
            env::set_var(key, value);
        }
        Self {
            key: key.to_string(),
            original_value,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original_value {
                Some(value) => env::set_var(&self.key, value),
                None => env::remove_var(&self.key),
            }
        }
    }
}
