//! Enrollment and node key specs

use crate::prelude::*;

#[tokio::test]
async fn enrolled_agent_authenticates_with_its_node_key() {
    let fleet = Fleet::new();
    let key = fleet.enroll("host123").await;
    assert!(!key.is_empty());

    let (status, config) = fleet.agent("config", json!({"node_key": key})).await;
    assert_eq!(status, StatusCode::OK, "{config}");
    assert!(config["options"].is_object());

    let host = fleet.host(&key).await;
    assert_eq!(host.osquery_host_id, "host123");
}

#[tokio::test]
async fn unknown_node_key_is_node_invalid() {
    let fleet = Fleet::new();
    fleet.enroll("host123").await;

    let (status, body) = fleet.agent("distributed/read", json!({"node_key": "K-bad"})).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["node_invalid"], json!(true));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn wrong_enroll_secret_is_rejected() {
    let fleet = Fleet::new();

    let (status, body) = fleet.agent("enroll", json!({"enroll_secret": "nope", "host_identifier": "h"})).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["node_invalid"], json!(true));
    assert!(fleet.store.list_hosts().await.unwrap().is_empty());
}

#[tokio::test]
async fn reenrollment_rotates_the_key_and_keeps_the_host() {
    let fleet = Fleet::new();
    let first = fleet.enroll("host123").await;
    let id = fleet.host(&first).await.id;

    let second = fleet.enroll("host123").await;

    assert_ne!(first, second);
    assert_eq!(fleet.host(&second).await.id, id);
    let (status, _) = fleet.agent("config", json!({"node_key": first})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
