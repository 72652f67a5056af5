//! Concurrent writers against a file database with a multi-connection pool,
//! so transactions genuinely overlap instead of queueing on one connection.

use std::collections::HashSet;

use serde_json::json;
use user_identity_store::{User, UserError, UserPatch};

use crate::common::{file_user_store, new_user};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_creates_across_connections() {
    const N: usize = 100;
    let (_dir, store) = file_user_store().await;

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.create_user(new_user(&format!("user-{i}"), None)).await })
        })
        .collect();

    let mut created = Vec::with_capacity(N);
    let mut errors: Vec<UserError> = Vec::new();
    for handle in handles {
        match handle.await.expect("task should not panic") {
            Ok(user) => created.push(user),
            Err(e) => errors.push(e),
        }
    }
    assert!(errors.is_empty(), "creates failed: {errors:?}");

    let ids: HashSet<i64> = created.iter().map(|u| u.id).collect();
    let internal_ids: HashSet<i64> = created.iter().map(|u| u.internal_id).collect();
    assert_eq!(ids.len(), N);
    assert_eq!(internal_ids.len(), N);

    // No gaps either: the counter handed out exactly 1..=N
    assert_eq!(internal_ids, (1..=N as i64).collect());
    assert_eq!(store.get_all_users().await.expect("list").len(), N);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_upserts_on_new_internal_id_insert_once() {
    const WRITERS: usize = 20;
    const INTERNAL_ID: i64 = 9999;
    let (_dir, store) = file_user_store().await;

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let patch: UserPatch =
                    serde_json::from_value(json!({ "one": format!("writer-{i}") }))
                        .expect("valid payload");
                store.upsert_user_by_internal_id(INTERNAL_ID, patch).await
            })
        })
        .collect();

    let mut results: Vec<User> = Vec::with_capacity(WRITERS);
    for handle in handles {
        results.push(
            handle
                .await
                .expect("task should not panic")
                .expect("upsert should succeed"),
        );
    }

    // Every writer landed on the same row
    let ids: HashSet<i64> = results.iter().map(|u| u.id).collect();
    assert_eq!(ids.len(), 1);

    let users = store.get_all_users().await.expect("list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].internal_id, INTERNAL_ID);

    let last = users[0].one.as_deref().expect("one is set");
    assert!(
        results.iter().any(|u| u.one.as_deref() == Some(last)),
        "stored value {last} was not written by any upsert"
    );
}
