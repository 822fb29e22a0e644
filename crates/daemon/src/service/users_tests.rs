// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::Config;
use crate::service::test_helpers::{harness, harness_with};
use fleet_core::Clock;
use fleet_storage::Datastore;
use std::time::Duration;

fn field_names(err: ServiceError) -> Vec<String> {
    match err {
        ServiceError::Invalid(args) => args.errors().iter().map(|e| e.name.clone()).collect(),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn session_token_resolves_viewer_and_touches_session() {
    let h = harness();
    let viewer = h.viewer("alice", false).await;

    h.clock.advance(Duration::from_secs(120));
    let resolved = h.service.authenticate_session("token-alice").await.unwrap();

    assert_eq!(resolved.user.username, "alice");
    assert_eq!(resolved.session.accessed_at, h.clock.now());
    assert_eq!(h.store.session_by_key("token-alice").await.unwrap().accessed_at, h.clock.now());
    assert_eq!(resolved.session.id, viewer.session.id);
}

#[tokio::test]
async fn bad_tokens_are_unauthorized() {
    let h = harness();
    h.viewer("alice", false).await;

    for token in ["", "token-mallory"] {
        assert!(matches!(h.service.authenticate_session(token).await, Err(ServiceError::Unauthorized(_))));
    }
}

#[tokio::test]
async fn idle_sessions_expire_and_are_deleted() {
    let mut config = Config::default();
    config.session.expiration_seconds = 60;
    let h = harness_with(config);
    h.viewer("alice", false).await;

    h.clock.advance(Duration::from_secs(61));

    assert_eq!(
        h.service.authenticate_session("token-alice").await,
        Err(ServiceError::Unauthorized("session expired".into()))
    );
    assert!(h.store.session_by_key("token-alice").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn disabled_users_cannot_authenticate() {
    let h = harness();
    let mut viewer = h.viewer("alice", false).await;
    viewer.user.enabled = false;
    h.store.save_user(&viewer.user).await.unwrap();

    assert!(matches!(
        h.service.authenticate_session("token-alice").await,
        Err(ServiceError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn admin_gate() {
    let h = harness();
    assert!(must_be_admin(&h.viewer("root", true).await).is_ok());
    assert!(matches!(must_be_admin(&h.viewer("bob", false).await), Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn users_may_edit_own_profile() {
    let h = harness();
    let alice = h.viewer("alice", false).await;
    let payload = UserPayload { name: Some("Alice A".into()), position: Some("SRE".into()), ..Default::default() };

    let user = h.service.modify_user(&alice, alice.user_id(), &payload).await.unwrap();

    assert_eq!((user.name.as_str(), user.position.as_str()), ("Alice A", "SRE"));
    assert_eq!(h.store.user(alice.user_id()).await.unwrap().name, "Alice A");
}

#[tokio::test]
async fn non_admin_cannot_touch_admin_fields() {
    let h = harness();
    let alice = h.viewer("alice", false).await;
    let payload = UserPayload { admin: Some(true), enabled: Some(true), ..Default::default() };

    let err = h.service.modify_user(&alice, alice.user_id(), &payload).await.unwrap_err();

    assert_eq!(field_names(err), vec!["enabled", "admin"]);
    assert!(!h.store.user(alice.user_id()).await.unwrap().admin);
}

#[tokio::test]
async fn non_admin_cannot_modify_others() {
    let h = harness();
    let alice = h.viewer("alice", false).await;
    let bob = h.viewer("bob", false).await;
    let payload = UserPayload { email: Some("evil@example.com".into()), ..Default::default() };

    assert!(matches!(
        h.service.modify_user(&alice, bob.user_id(), &payload).await,
        Err(ServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn admins_may_modify_anyone() {
    let h = harness();
    let root = h.viewer("root", true).await;
    let bob = h.viewer("bob", false).await;
    let payload = UserPayload {
        enabled: Some(false),
        force_password_reset: Some(true),
        email: Some("bob@corp.example".into()),
        ..Default::default()
    };

    let user = h.service.modify_user(&root, bob.user_id(), &payload).await.unwrap();

    assert!(!user.enabled);
    assert!(user.force_password_reset);
    assert_eq!(user.email, "bob@corp.example");
}

#[test]
fn validation_flags_every_failing_field() {
    let viewer = Viewer {
        user: User::builder().id(UserId::new(1)).build(),
        session: Session {
            id: fleet_core::SessionId::new(1),
            user_id: UserId::new(1),
            key: "k".into(),
            accessed_at: chrono::Utc::now(),
            created_at: chrono::Utc::now(),
        },
    };
    let payload = UserPayload {
        username: Some(" ".into()),
        email: Some("nope".into()),
        password: Some("hunter2".into()),
        admin: Some(false),
        ..Default::default()
    };

    let err = validate_modify_user(&viewer, UserId::new(2), &payload).unwrap_err();

    assert_eq!(
        field_names(err),
        vec!["admin", "username", "email", "password", "username", "email"]
    );
}

#[tokio::test]
async fn reading_unknown_user_is_not_found() {
    let h = harness();
    let alice = h.viewer("alice", false).await;
    assert!(matches!(h.service.get_user(&alice, UserId::new(999)).await, Err(ServiceError::NotFound(_))));
}
