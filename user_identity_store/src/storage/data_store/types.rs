use std::{fmt::Debug, str::FromStr};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Postgres, Sqlite};

use crate::storage::errors::StorageError;

// Types
#[derive(Clone, Debug)]
pub struct SqliteDataStore {
    pool: sqlx::SqlitePool,
}

#[derive(Clone, Debug)]
pub struct PostgresDataStore {
    pool: sqlx::PgPool,
}

// Trait
pub trait DataStore: Debug + Send + Sync {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>>;
    fn as_postgres(&self) -> Option<&Pool<Postgres>>;
}

impl SqliteDataStore {
    /// Create a lazily connecting SQLite pool for `url`.
    ///
    /// Every connection to an in-memory database sees its own empty database,
    /// so in-memory stores are limited to a single connection that is never
    /// recycled. File databases run in WAL mode.
    pub fn connect_lazy(url: &str) -> Result<Self, StorageError> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(|e| StorageError::Config(format!("Invalid SQLite connection string: {e}")))?
            .create_if_missing(true);

        let pool = if is_in_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_lazy_with(opts)
        } else {
            SqlitePoolOptions::new().connect_lazy_with(opts.journal_mode(SqliteJournalMode::Wal))
        };

        Ok(Self { pool })
    }

    /// A fresh, private in-memory database.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::connect_lazy("sqlite::memory:")
    }

    pub fn from_pool(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

impl PostgresDataStore {
    pub fn connect_lazy(url: &str) -> Result<Self, StorageError> {
        let pool = sqlx::PgPool::connect_lazy(url)
            .map_err(|e| StorageError::Storage(format!("Failed to create Postgres pool: {e}")))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn is_in_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

// Store implementations
impl DataStore for SqliteDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        Some(&self.pool)
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        None
    }
}

impl DataStore for PostgresDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        None
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        Some(&self.pool)
    }
}
