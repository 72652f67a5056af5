use std::sync::Arc;

use crate::storage::DataStore;
use crate::userdb::{
    errors::UserError,
    types::{NewUser, User, UserPatch, UserSearchField},
};

use super::postgres::*;
use super::sqlite::*;

/// Data-access layer for the users table.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct UserStore {
    store: Arc<dyn DataStore>,
}

impl UserStore {
    /// Wrap a data store whose schema has already been migrated
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub fn data_store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// All users, ordered by `id`
    #[tracing::instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<User>, UserError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            get_all_users_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_all_users_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(users) => {
                tracing::info!(user_count = users.len(), "User listing completed");
            }
            Err(e) => {
                tracing::error!(error = %e, "User listing failed");
            }
        }

        result
    }

    /// Create a user, issuing a fresh `id` and a fresh `internal_id`
    #[tracing::instrument(skip(self, new_user))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, UserError> {
        tracing::debug!(one = ?new_user.one, two = ?new_user.two, "Creating user");

        let result = if let Some(pool) = self.store.as_sqlite() {
            create_user_sqlite(pool, &new_user).await
        } else if let Some(pool) = self.store.as_postgres() {
            create_user_postgres(pool, &new_user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => {
                tracing::info!(
                    user_id = user.id,
                    internal_id = user.internal_id,
                    "User created"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "User creation failed");
            }
        }

        result
    }

    /// Get a user by their primary key
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<User, UserError> {
        self.get_user_by(UserSearchField::Id(id))
            .await?
            .ok_or(UserError::NotFound)
    }

    /// Get a user by their internal id. The unique index guarantees at most one match.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_internal_id(&self, internal_id: i64) -> Result<User, UserError> {
        self.get_user_by(UserSearchField::InternalId(internal_id))
            .await?
            .ok_or(UserError::NotFound)
    }

    #[tracing::instrument(skip(self), fields(user_field = %field))]
    pub async fn get_user_by(&self, field: UserSearchField) -> Result<Option<User>, UserError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            get_user_by_field_sqlite(pool, &field).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_by_field_postgres(pool, &field).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(Some(_)) => {
                tracing::info!(found = true, "User lookup completed");
            }
            Ok(None) => {
                tracing::info!(found = false, "User lookup completed - not found");
            }
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed");
            }
        }

        result
    }

    /// Apply `patch` to the text attributes of user `id`. Identifiers never change.
    #[tracing::instrument(skip(self, patch), fields(user_id = id))]
    pub async fn update_user(&self, id: i64, patch: UserPatch) -> Result<User, UserError> {
        tracing::debug!(?patch, "Updating user");

        let result = if let Some(pool) = self.store.as_sqlite() {
            update_user_sqlite(pool, id, &patch).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_user_postgres(pool, id, &patch).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match result {
            Ok(Some(user)) => {
                tracing::info!("User update completed");
                Ok(user)
            }
            Ok(None) => {
                tracing::info!("User update skipped - not found");
                Err(UserError::NotFound)
            }
            Err(e) => {
                tracing::error!(error = %e, "User update failed");
                Err(e)
            }
        }
    }

    /// Insert a user under a caller-chosen `internal_id`, or patch the user
    /// that already holds it.
    ///
    /// On insert, absent and null fields are both stored as NULL.
    #[tracing::instrument(skip(self, patch))]
    pub async fn upsert_user_by_internal_id(
        &self,
        internal_id: i64,
        patch: UserPatch,
    ) -> Result<User, UserError> {
        tracing::debug!(?patch, "Upserting user");

        let result = if let Some(pool) = self.store.as_sqlite() {
            upsert_user_by_internal_id_sqlite(pool, internal_id, &patch).await
        } else if let Some(pool) = self.store.as_postgres() {
            upsert_user_by_internal_id_postgres(pool, internal_id, &patch).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "User upsert completed successfully");
            }
            Err(e) => {
                tracing::error!(error = %e, "User upsert failed");
            }
        }

        result
    }

    /// Insert a user under a caller-chosen `internal_id`, bypassing the
    /// counter. A duplicate is rejected with [`UserError::ConstraintViolation`].
    #[tracing::instrument(skip(self, new_user))]
    pub async fn insert_user_with_internal_id(
        &self,
        internal_id: i64,
        new_user: NewUser,
    ) -> Result<User, UserError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            insert_user_with_internal_id_sqlite(pool, internal_id, &new_user).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_user_with_internal_id_postgres(pool, internal_id, &new_user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "User inserted");
            }
            Err(e) => {
                tracing::error!(error = %e, "User insert failed");
            }
        }

        result
    }

    /// Hard delete. The row's identifiers are not handed out again.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<(), UserError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            delete_user_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match result {
            Ok(true) => {
                tracing::info!("User deleted");
                Ok(())
            }
            Ok(false) => {
                tracing::info!("User delete skipped - not found");
                Err(UserError::NotFound)
            }
            Err(e) => {
                tracing::error!(error = %e, "User delete failed");
                Err(e)
            }
        }
    }
}
