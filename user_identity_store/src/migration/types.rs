use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::config::{DB_TABLE_USERS, users_internal_id_index, users_internal_id_seq};

use super::postgres::create_users_script_postgres;
use super::sqlite::create_users_script_sqlite;

/// One versioned schema change, with a script per backend.
///
/// Scripts may hold several statements. They are applied inside a single
/// transaction together with the ledger entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub name: String,
    pub sqlite: String,
    pub postgres: String,
}

impl Migration {
    pub fn new(
        version: i64,
        name: impl Into<String>,
        sqlite: impl Into<String>,
        postgres: impl Into<String>,
    ) -> Self {
        Self {
            version,
            name: name.into(),
            sqlite: sqlite.into(),
            postgres: postgres.into(),
        }
    }
}

/// A row of the migration ledger
#[derive(Clone, Debug, FromRow, PartialEq)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// The ordered migrations that build the user identity schema
pub fn user_migrations() -> Vec<Migration> {
    let table = DB_TABLE_USERS.as_str();
    let index = users_internal_id_index();
    let seq = users_internal_id_seq();

    vec![Migration::new(
        1,
        "create_users",
        create_users_script_sqlite(table, &index, &seq),
        create_users_script_postgres(table, &index),
    )]
}
