//! Data store configuration

use std::{env, str::FromStr, sync::Arc};

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};
use crate::storage::errors::StorageError;

/// Supported storage engines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreType {
    Sqlite,
    Postgres,
}

impl FromStr for StoreType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" => Ok(Self::Postgres),
            t => Err(StorageError::Config(format!(
                "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
            ))),
        }
    }
}

/// Which database to use and where to find it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub store_type: StoreType,
    pub url: String,
}

impl StoreConfig {
    pub fn new(store_type: StoreType, url: impl Into<String>) -> Self {
        Self {
            store_type,
            url: url.into(),
        }
    }

    /// Read `GENERIC_DATA_STORE_TYPE` and `GENERIC_DATA_STORE_URL`
    pub fn from_env() -> Result<Self, StorageError> {
        let store_type = env::var("GENERIC_DATA_STORE_TYPE").map_err(|_| {
            StorageError::Config("GENERIC_DATA_STORE_TYPE must be set".to_string())
        })?;
        let url = env::var("GENERIC_DATA_STORE_URL").map_err(|_| {
            StorageError::Config("GENERIC_DATA_STORE_URL must be set".to_string())
        })?;

        Ok(Self {
            store_type: store_type.parse()?,
            url,
        })
    }

    /// Build the connection pool. Connections are opened on first use.
    pub fn connect(&self) -> Result<Arc<dyn DataStore>, StorageError> {
        tracing::info!(store_type = ?self.store_type, "Initializing data store");

        let store: Arc<dyn DataStore> = match self.store_type {
            StoreType::Sqlite => Arc::new(SqliteDataStore::connect_lazy(&self.url)?),
            StoreType::Postgres => Arc::new(PostgresDataStore::connect_lazy(&self.url)?),
        };

        Ok(store)
    }
}
