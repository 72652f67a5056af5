use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Unique and not-null violations are rejected by the engine itself and
/// surface as [`UserError::ConstraintViolation`]; everything else is a
/// storage failure.
impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => UserError::ConstraintViolation(db_err.to_string()),
                _ => UserError::Storage(err.to_string()),
            },
            _ => UserError::Storage(err.to_string()),
        }
    }
}
