// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn enroll_creates_host_with_detail_sentinel() {
    let store = MemStore::new();
    let host = store.enroll_host("h1", "k1", t0()).await.unwrap();

    assert_eq!(host.id, HostId::new(1));
    assert_eq!(host.osquery_host_id, "h1");
    assert_eq!(host.node_key, "k1");
    assert_eq!(host.detail_update_time, fleet_core::host::detail_update_sentinel());
}

#[tokio::test]
async fn re_enroll_keeps_id_and_rotates_key() {
    let store = MemStore::new();
    let first = store.enroll_host("h1", "k1", t0()).await.unwrap();
    let second = store.enroll_host("h1", "k2", t0()).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.authenticate_host("k2").await.unwrap().id, first.id);
    assert!(store.authenticate_host("k1").await.unwrap_err().is_not_found());
    assert_eq!(store.list_hosts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn enroll_rejects_node_key_held_by_other_host() {
    let store = MemStore::new();
    store.enroll_host("h1", "k1", t0()).await.unwrap();
    let err = store.enroll_host("h2", "k1", t0()).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[yare::parameterized(
    empty = { "" },
    bogus = { "not-a-key" },
)]
fn authenticate_unknown_key_is_not_found(key: &str) {
    let store = MemStore::new();
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async {
        store.enroll_host("h1", "k1", t0()).await.unwrap();
        assert!(store.authenticate_host(key).await.unwrap_err().is_not_found());
    });
}

#[tokio::test]
async fn new_host_rejects_duplicate_osquery_id() {
    let store = MemStore::new();
    store.new_host(Host::builder().osquery_host_id("dup").node_key("a").build()).await.unwrap();
    let err = store
        .new_host(Host::builder().osquery_host_id("dup").node_key("b").build())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn mark_seen_updates_seen_time() {
    let store = MemStore::new();
    let host = store.enroll_host("h1", "k1", t0()).await.unwrap();
    store.mark_host_seen(host.id, t0() + minutes(5)).await.unwrap();
    assert_eq!(store.host(host.id).await.unwrap().seen_time, t0() + minutes(5));
}

#[tokio::test]
async fn delete_host_cascades_memberships_and_executions() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let label = regular_label(&store, "Linux", "linux").await;
    store
        .record_label_query_executions(&host, &BTreeMap::from([(label.id, true)]), t0())
        .await
        .unwrap();

    store.delete_host(host.id).await.unwrap();

    assert!(store.host(host.id).await.unwrap_err().is_not_found());
    assert!(store.list_hosts_in_label(label.id).await.unwrap().is_empty());
    assert!(store.delete_host(host.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn status_summary_counts_by_seen_time() {
    let store = MemStore::new();
    for (name, ago) in [("a", minutes(1)), ("b", minutes(120)), ("c", chrono::Duration::days(40))] {
        let host = store.enroll_host(name, &format!("k-{name}"), t0()).await.unwrap();
        store.mark_host_seen(host.id, t0() - ago).await.unwrap();
    }

    let summary = store.host_status_summary(t0()).await.unwrap();
    assert_eq!(summary, HostSummary { online_count: 1, offline_count: 1, mia_count: 1 });
}

#[tokio::test]
async fn update_host_details_keeps_stored_credential() {
    let store = MemStore::new();
    let mut stale = store.enroll_host("h1", "k1", t0()).await.unwrap();
    store.enroll_host("h1", "k2", t0()).await.unwrap();

    stale.platform = "darwin".to_string();
    stale.seen_time = t0() + chrono::Duration::minutes(1);
    store.update_host_details(&stale).await.unwrap();

    let stored = store.authenticate_host("k2").await.unwrap();
    assert_eq!(stored.node_key, "k2");
    assert_eq!(stored.platform, "darwin");
    assert_eq!(stored.seen_time, stale.seen_time);
    assert!(store.authenticate_host("k1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn update_host_details_unknown_host_is_not_found() {
    let store = MemStore::new();
    let ghost = Host::builder().id(HostId::new(99)).build();
    assert!(store.update_host_details(&ghost).await.unwrap_err().is_not_found());
}
