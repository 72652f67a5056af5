mod config;
mod types;

pub use config::{StoreConfig, StoreType};
pub use types::{DataStore, PostgresDataStore, SqliteDataStore};
