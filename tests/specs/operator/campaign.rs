//! Distributed query campaign specs

use crate::prelude::*;
use fleet_core::{CampaignId, ExecutionStatus};
use fleet_daemon::{BusMessage, ResultStore};

async fn run(fleet: &Fleet, token: &str, query: &str, hosts: &[&Host]) -> CampaignId {
    let ids: Vec<_> = hosts.iter().map(|h| h.id).collect();
    let body = json!({"query": query, "selected": {"hosts": ids, "labels": []}});
    let (status, value) = fleet.call(Method::POST, "/api/v1/kolide/queries/run", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{value}");
    assert_eq!(value["campaign"]["status"], json!("running"));
    serde_json::from_value(value["campaign"]["id"].clone()).unwrap()
}

#[tokio::test]
async fn campaign_fans_out_and_streams_results() {
    let fleet = Fleet::new();
    let token = fleet.operator("alice", false).await;
    let (key_a, a) = fleet.enroll_on("a", "darwin").await;
    let (key_b, b) = fleet.enroll_on("b", "linux").await;
    let id = run(&fleet, &token, "select 42 as answer", &[&a, &b]).await;
    let mut subscription = fleet.bus.subscribe(id).await.unwrap();
    let name = QueryKey::campaign(id);

    for key in [&key_a, &key_b] {
        let read = fleet.read(key).await;
        assert_eq!(read["queries"][&name], json!("select 42 as answer"));
        assert!(fleet.read(key).await["queries"].get(&name).is_none());
    }

    fleet.write(&key_a, json!({ &name: [{"answer": "42"}] }), json!({ &name: 0 })).await;
    fleet.write(&key_b, json!({}), json!({ &name: "1" })).await;

    let Some(BusMessage::Result(first)) = subscription.recv().await else { panic!("expected a result") };
    assert_eq!(first.host.id, a.id);
    assert_eq!(first.rows.len(), 1);
    assert_eq!(first.error, None);
    let Some(BusMessage::Result(second)) = subscription.recv().await else { panic!("expected a result") };
    assert_eq!(second.host.id, b.id);
    assert!(second.rows.is_empty());
    assert_eq!(second.error.as_deref(), Some("agent reported status 1"));

    let done = fleet.store.distributed_query_execution(a.id, id).await.unwrap();
    assert_eq!(done.status, ExecutionStatus::Succeeded);
    let failed = fleet.store.distributed_query_execution(b.id, id).await.unwrap();
    assert_eq!(failed.status, ExecutionStatus::Failed);
}

#[tokio::test]
async fn results_without_a_subscriber_still_complete_the_execution() {
    let fleet = Fleet::new();
    let token = fleet.operator("alice", false).await;
    let (key, host) = fleet.enroll_on("a", "darwin").await;
    let id = run(&fleet, &token, "select 1", &[&host]).await;
    let name = QueryKey::campaign(id);
    fleet.read(&key).await;

    fleet.write(&key, json!({ &name: [{"1": "1"}] }), json!({ &name: 0 })).await;

    let execution = fleet.store.distributed_query_execution(host.id, id).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Succeeded);
    assert_eq!(fleet.bus.subscriber_count(id), 0);
}

#[tokio::test]
async fn completed_campaign_is_no_longer_handed_out() {
    let fleet = Fleet::new();
    let token = fleet.operator("alice", false).await;
    let (key, host) = fleet.enroll_on("a", "darwin").await;
    let id = run(&fleet, &token, "select 1", &[&host]).await;

    let uri = format!("/api/v1/kolide/queries/run/{id}/complete");
    let (status, value) = fleet.call(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{value}");
    assert_eq!(value["campaign"]["status"], json!("complete"));

    assert!(fleet.read(&key).await["queries"].get(QueryKey::campaign(id)).is_none());
    let (status, _) = fleet.call(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn campaign_requires_a_query_and_targets() {
    let fleet = Fleet::new();
    let token = fleet.operator("alice", false).await;

    let body = json!({"query": "", "selected": {"hosts": [], "labels": []}});
    let (status, value) = fleet.call(Method::POST, "/api/v1/kolide/queries/run", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = value["errors"].as_array().unwrap().iter().filter_map(|e| e["name"].as_str()).collect();
    similar_asserts::assert_eq!(fields, vec!["query", "targets"]);
}
