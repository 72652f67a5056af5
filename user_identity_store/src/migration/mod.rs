mod errors;
mod migrator;
mod postgres;
mod sqlite;
mod types;

pub use errors::MigrationError;
pub use migrator::Migrator;
pub use types::{AppliedMigration, Migration, user_migrations};
