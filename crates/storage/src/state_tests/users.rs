// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn session_lifecycle() {
    let store = MemStore::new();
    let user = store.new_user(User::builder().username("alice").build()).await.unwrap();

    let session = store.new_session(user.id, "token-1", t0()).await.unwrap();
    assert_eq!(store.session_by_key("token-1").await.unwrap().user_id, user.id);

    store.mark_session_accessed(session.id, t0() + minutes(3)).await.unwrap();
    assert_eq!(store.session_by_key("token-1").await.unwrap().accessed_at, t0() + minutes(3));

    store.delete_session(session.id).await.unwrap();
    assert!(store.session_by_key("token-1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn session_requires_known_user_and_unique_key() {
    let store = MemStore::new();
    assert!(store.new_session(UserId::new(9), "k", t0()).await.unwrap_err().is_not_found());

    let user = store.new_user(User::builder().build()).await.unwrap();
    store.new_session(user.id, "k", t0()).await.unwrap();
    let err = store.new_session(user.id, "k", t0()).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn usernames_are_unique() {
    let store = MemStore::new();
    let alice = store.new_user(User::builder().username("alice").build()).await.unwrap();
    let bob = store.new_user(User::builder().username("bob").build()).await.unwrap();

    let renamed = User { username: "alice".to_string(), ..bob };
    let err = store.save_user(&renamed).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));

    let updated = User { position: "SRE".to_string(), ..alice };
    store.save_user(&updated).await.unwrap();
    assert_eq!(store.user(updated.id).await.unwrap().position, "SRE");
}
