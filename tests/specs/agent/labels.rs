//! Label membership specs

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn label_query_is_sent_until_answered() {
    let fleet = Fleet::new();
    let label = fleet.label("Linux hosts", "linux", "select 1 from os_version where platform = 'ubuntu'").await;
    let (key, host) = fleet.enroll_on("h1", "linux").await;
    let name = QueryKey::label(label.id);

    let read = fleet.read(&key).await;
    assert_eq!(read["queries"][&name], json!(label.query));

    fleet.write(&key, json!({ &name: [{"1": "1"}] }), json!({ &name: 0 })).await;

    let read = fleet.read(&key).await;
    assert!(read["queries"].get(&name).is_none(), "{read}");
    let members = fleet.store.list_hosts_in_label(label.id).await.unwrap();
    assert_eq!(members.into_iter().map(|h| h.id).collect::<Vec<_>>(), vec![host.id]);
}

#[tokio::test]
async fn empty_label_result_is_a_non_match() {
    let fleet = Fleet::new();
    let label = fleet.label("Linux hosts", "linux", "select 1").await;
    let (key, _) = fleet.enroll_on("h1", "linux").await;
    let name = QueryKey::label(label.id);

    fleet.write(&key, json!({ &name: [] }), json!({})).await;

    assert!(fleet.store.list_hosts_in_label(label.id).await.unwrap().is_empty());
    assert!(fleet.read(&key).await["queries"].get(&name).is_none());
}

#[tokio::test]
async fn label_for_another_platform_is_never_sent() {
    let fleet = Fleet::new();
    let label = fleet.label("Windows hosts", "windows", "select 1").await;
    let (key, _) = fleet.enroll_on("h1", "darwin").await;

    let read = fleet.read(&key).await;

    assert!(read["queries"].get(QueryKey::label(label.id)).is_none(), "{read}");
}

#[tokio::test]
async fn label_is_asked_again_after_the_update_interval() {
    let fleet = Fleet::new();
    let label = fleet.label("Linux hosts", "linux", "select 1").await;
    let (key, _) = fleet.enroll_on("h1", "linux").await;
    let name = QueryKey::label(label.id);
    fleet.write(&key, json!({ &name: [{"1": "1"}] }), json!({})).await;

    fleet.advance(Duration::from_secs(3600 + 1));

    assert!(fleet.read(&key).await["queries"].get(&name).is_some());
}
