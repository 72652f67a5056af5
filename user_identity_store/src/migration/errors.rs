use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum MigrationError {
    #[error("Migration {version} ({name}) failed: {reason}")]
    ApplyFailure {
        version: i64,
        name: String,
        reason: String,
    },

    #[error("Migration versions must be strictly increasing: {next} follows {previous}")]
    OutOfOrder { previous: i64, next: i64 },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for MigrationError {
    fn from(err: sqlx::Error) -> Self {
        MigrationError::Storage(err.to_string())
    }
}
