//! Target picker specs

use crate::prelude::*;

#[tokio::test]
async fn search_finds_hosts_by_name_and_counts_the_selection() {
    let fleet = Fleet::new();
    let token = fleet.operator("alice", false).await;
    let mut ids = Vec::new();
    for name in ["web-1", "web-2", "db-1"] {
        let key = fleet.enroll(name).await;
        let mut host = fleet.host(&key).await;
        host.host_name = name.to_string();
        fleet.store.save_host(&host).await.unwrap();
        ids.push(host.id);
    }

    let body = json!({"query": "web", "selected": {"hosts": [ids[2]], "labels": []}});
    let (status, value) = fleet.call(Method::POST, "/api/v1/kolide/targets", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::OK, "{value}");
    let names: Vec<_> = value["targets"]["hosts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["host_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["web-1", "web-2"]);
    assert_eq!(value["targets"]["hosts"][0]["status"], json!("online"));
    assert_eq!(value["targets_count"], json!(1));
    assert_eq!(value["targets_online"], json!(1));
}

#[tokio::test]
async fn search_requires_a_session() {
    let fleet = Fleet::new();

    let (status, _) = fleet.call(Method::POST, "/api/v1/kolide/targets", None, Some(json!({"query": "web"}))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
