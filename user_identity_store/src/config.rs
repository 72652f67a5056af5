//! Table naming for the user identity store

use std::{env, sync::LazyLock};

/// Table prefix from environment variable. Empty by default, so the users
/// table is plainly named `users`.
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_default());

/// Users table name
pub(crate) static DB_TABLE_USERS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_USERS").unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "users"))
});

/// Ledger of applied migrations
pub(crate) static DB_TABLE_MIGRATIONS: LazyLock<String> =
    LazyLock::new(|| format!("{}{}", *DB_TABLE_PREFIX, "schema_migrations"));

/// Name of the unique index over `internal_id`
pub(crate) fn users_internal_id_index() -> String {
    internal_id_index_name(&DB_TABLE_USERS)
}

/// Name of the SQLite counter table that issues `internal_id` values
pub(crate) fn users_internal_id_seq() -> String {
    internal_id_seq_name(&DB_TABLE_USERS)
}

fn internal_id_index_name(users_table: &str) -> String {
    format!("{users_table}_internal_id")
}

fn internal_id_seq_name(users_table: &str) -> String {
    format!("{users_table}_internal_id_seq")
}

/// Checks the users table name together with the index and counter table
/// names derived from it. PostgreSQL truncates longer names to 63 bytes, so
/// every derived name has to fit as well.
pub(crate) fn validate_users_table(users_table: &str) -> Result<(), String> {
    validate_identifier(users_table)?;
    for derived in [
        internal_id_index_name(users_table),
        internal_id_seq_name(users_table),
    ] {
        validate_identifier(&derived).map_err(|_| {
            format!(
                "Table name '{users_table}' is too long: derived name '{derived}' exceeds 63 bytes"
            )
        })?;
    }
    Ok(())
}

/// Table names are spliced into SQL text, so only plain identifiers are accepted.
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    if starts_well && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name.len() <= 63 {
        Ok(())
    } else {
        Err(format!("Invalid table name: '{name}'"))
    }
}
