use serial_test::serial;
use user_identity_store::{
    DataStore, MigrationError, Migrator, NewUser, SqliteDataStore, init, init_with_store,
};

use crate::common::{EnvVarGuard, memory_store};

#[tokio::test]
async fn test_reapplying_schema_migration_fails() {
    let store = memory_store();
    let migrator = Migrator::new(store.clone());

    assert_eq!(migrator.run().await.expect("first run"), vec![1]);

    let create_users = migrator.migrations()[0].clone();
    let result = migrator.apply(&create_users).await;
    assert!(
        matches!(result, Err(MigrationError::ApplyFailure { version: 1, .. })),
        "expected ApplyFailure, got {result:?}"
    );

    // The table is still usable after the failed attempt
    let user_store = init_with_store(store).await.expect("init after failure");
    let user = user_store
        .create_user(NewUser::default())
        .await
        .expect("create");
    assert_eq!(user.id, 1);
}

#[tokio::test]
async fn test_init_with_store_is_idempotent() {
    let store = memory_store();

    let first = init_with_store(store.clone()).await.expect("first init");
    let created = first
        .create_user(NewUser::new(Some("kept"), None))
        .await
        .expect("create");

    let second = init_with_store(store.clone()).await.expect("second init");
    let found = second.get_user(created.id).await.expect("row survives");
    assert_eq!(found, created);

    let ledger = Migrator::new(store)
        .applied_versions()
        .await
        .expect("ledger");
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn test_table_created_outside_migrations_blocks_run() {
    let store = SqliteDataStore::in_memory().expect("in-memory store");
    let pool = store.as_sqlite().expect("sqlite pool").clone();

    // Someone created the users table by hand, without the ledger knowing
    sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY)")
        .execute(&pool)
        .await
        .expect("manual table");

    let result = Migrator::new(std::sync::Arc::new(store)).run().await;
    assert!(matches!(result, Err(MigrationError::ApplyFailure { .. })));
}

#[tokio::test]
#[serial]
async fn test_init_from_environment() {
    let _type = EnvVarGuard::set("GENERIC_DATA_STORE_TYPE", "sqlite");
    let _url = EnvVarGuard::set("GENERIC_DATA_STORE_URL", "sqlite::memory:");

    let store = init().await.expect("init from environment");
    let user = store
        .create_user(NewUser::new(Some("env"), None))
        .await
        .expect("create");
    assert_eq!((user.id, user.internal_id), (1, 1));
}

#[tokio::test]
#[serial]
async fn test_init_with_unsupported_store_type_fails() {
    {
        let _type = EnvVarGuard::set("GENERIC_DATA_STORE_TYPE", "mysql");
        let _url = EnvVarGuard::set("GENERIC_DATA_STORE_URL", "mysql://localhost/users");

        let err = init().await.unwrap_err();
        assert!(err.to_string().contains("Unsupported store type"));
    }

    // The guards put the previous values back
    assert_ne!(
        std::env::var("GENERIC_DATA_STORE_TYPE").ok().as_deref(),
        Some("mysql")
    );
}
