use std::collections::HashSet;

use serde_json::json;
use user_identity_store::{NewUser, Patch, UserError, UserPatch};

use crate::common::{fresh_user_store, new_user};

/// Creating two users on an empty store and looking them up by internal id
#[tokio::test]
async fn test_create_and_lookup_by_internal_id() {
    let store = fresh_user_store().await;

    let alice = store
        .create_user(new_user("alice", Some("bio-text")))
        .await
        .expect("create alice");
    assert_eq!((alice.id, alice.internal_id), (1, 1));

    let bob = store
        .create_user(NewUser::new(Some("bob"), None))
        .await
        .expect("create bob");
    assert_eq!((bob.id, bob.internal_id), (2, 2));

    let found = store
        .get_user_by_internal_id(1)
        .await
        .expect("alice should be found");
    assert_eq!(found.one.as_deref(), Some("alice"));
    assert_eq!(found.two.as_deref(), Some("bio-text"));

    let result = store.get_user_by_internal_id(3).await;
    assert!(matches!(result, Err(UserError::NotFound)));
}

/// N simultaneous creates yield N rows with distinct identifiers, each of
/// which can be looked up again
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates() {
    const N: usize = 100;
    let store = fresh_user_store().await;

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.create_user(new_user(&format!("user-{i}"), None)).await })
        })
        .collect();

    let mut created = Vec::with_capacity(N);
    for handle in handles {
        created.push(
            handle
                .await
                .expect("task should not panic")
                .expect("create should succeed"),
        );
    }

    let ids: HashSet<i64> = created.iter().map(|u| u.id).collect();
    let internal_ids: HashSet<i64> = created.iter().map(|u| u.internal_id).collect();
    assert_eq!(ids.len(), N);
    assert_eq!(internal_ids.len(), N);

    for user in &created {
        let found = store
            .get_user_by_internal_id(user.internal_id)
            .await
            .expect("every issued internal id resolves");
        assert_eq!(&found, user);
    }
}

#[tokio::test]
async fn test_forced_duplicate_internal_id_is_rejected() {
    let store = fresh_user_store().await;
    let alice = store
        .create_user(new_user("alice", None))
        .await
        .expect("create alice");

    let result = store
        .insert_user_with_internal_id(alice.internal_id, new_user("impostor", None))
        .await;
    assert!(matches!(result, Err(UserError::ConstraintViolation(_))));

    // Lookup still resolves to exactly the original row
    let found = store
        .get_user_by_internal_id(alice.internal_id)
        .await
        .expect("lookup");
    assert_eq!(found, alice);
}

#[tokio::test]
async fn test_update_keeps_identifiers() {
    let store = fresh_user_store().await;
    let user = store
        .create_user(new_user("before", Some("keep")))
        .await
        .expect("create");

    let patch = UserPatch {
        one: Patch::Some("after".to_string()),
        two: Patch::Missing,
    };
    let updated = store.update_user(user.id, patch).await.expect("update");

    assert_eq!(updated.id, user.id);
    assert_eq!(updated.internal_id, user.internal_id);
    assert_eq!(updated.one.as_deref(), Some("after"));
    assert_eq!(updated.two.as_deref(), Some("keep"));
}

/// A JSON request body drives a partial update the way a service layer would
#[tokio::test]
async fn test_update_from_json_body() {
    let store = fresh_user_store().await;
    let user = store
        .create_user(new_user("one", Some("two")))
        .await
        .expect("create");

    let patch: UserPatch =
        serde_json::from_value(json!({ "one": null })).expect("valid payload");
    let updated = store.update_user(user.id, patch).await.expect("update");

    assert_eq!(updated.one, None);
    assert_eq!(updated.two.as_deref(), Some("two"));

    let body = serde_json::to_value(&updated).expect("serialize user");
    assert_eq!(
        body,
        json!({ "id": user.id, "internal_id": user.internal_id, "one": null, "two": "two" })
    );
}

#[tokio::test]
async fn test_upsert_then_create_do_not_share_internal_ids() {
    let store = fresh_user_store().await;

    let external = store
        .upsert_user_by_internal_id(500, UserPatch::default())
        .await
        .expect("upsert insert");
    assert_eq!(external.internal_id, 500);

    let created = store
        .create_user(new_user("regular", None))
        .await
        .expect("create");
    assert_ne!(created.internal_id, external.internal_id);
    assert!(created.id > external.id);
}

#[tokio::test]
async fn test_deleted_identifiers_are_not_reused() {
    let store = fresh_user_store().await;

    let mut issued_ids = HashSet::new();
    let mut issued_internal_ids = HashSet::new();
    for round in 0..5 {
        let user = store
            .create_user(new_user(&format!("round-{round}"), None))
            .await
            .expect("create");
        assert!(issued_ids.insert(user.id), "id {} reused", user.id);
        assert!(
            issued_internal_ids.insert(user.internal_id),
            "internal_id {} reused",
            user.internal_id
        );
        store.delete_user(user.id).await.expect("delete");
    }

    assert!(store.get_all_users().await.expect("list").is_empty());
}
