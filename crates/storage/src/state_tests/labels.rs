// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn label_queries_respect_platform_filter() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "ubuntu").await;
    let linux = regular_label(&store, "Linux", "linux").await;
    let ubuntu_only = regular_label(&store, "Ubuntu hosts", "ubuntu").await;

    let queries = store.label_queries_for_host(&host, t0()).await.unwrap();

    assert!(queries.contains_key(&ubuntu_only.id));
    assert!(!queries.contains_key(&linux.id));
    // builtin "All Hosts" and "Ubuntu Linux"
    assert!(queries.contains_key(&LabelId::new(1)));
    assert!(queries.contains_key(&LabelId::new(3)));
    assert!(!queries.contains_key(&LabelId::new(2)));
}

#[tokio::test]
async fn label_queries_skip_labels_refreshed_since_cutoff() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let label = regular_label(&store, "Linux", "linux").await;

    store
        .record_label_query_executions(&host, &BTreeMap::from([(label.id, false)]), t0())
        .await
        .unwrap();

    // Updated exactly at the cutoff counts as fresh.
    let at_cutoff = store.label_queries_for_host(&host, t0()).await.unwrap();
    assert!(!at_cutoff.contains_key(&label.id));

    let later = store.label_queries_for_host(&host, t0() + minutes(1)).await.unwrap();
    assert_eq!(later.get(&label.id).map(String::as_str), Some("select 1"));
}

#[tokio::test]
async fn recording_twice_leaves_membership_unchanged() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let label = regular_label(&store, "Linux", "linux").await;
    let results = BTreeMap::from([(label.id, true)]);

    store.record_label_query_executions(&host, &results, t0()).await.unwrap();
    let once = store.list_labels_for_host(host.id).await.unwrap();
    store.record_label_query_executions(&host, &results, t0()).await.unwrap();
    let twice = store.list_labels_for_host(host.id).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice, vec![label]);
}

#[tokio::test]
async fn non_match_removes_host_from_label() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let label = regular_label(&store, "Linux", "linux").await;

    store
        .record_label_query_executions(&host, &BTreeMap::from([(label.id, true)]), t0())
        .await
        .unwrap();
    assert_eq!(store.list_hosts_in_label(label.id).await.unwrap().len(), 1);

    store
        .record_label_query_executions(&host, &BTreeMap::from([(label.id, false)]), t0() + minutes(1))
        .await
        .unwrap();
    assert!(store.list_hosts_in_label(label.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unique_hosts_in_labels_deduplicates() {
    let store = MemStore::new();
    let a = enrolled(&store, "a", "linux").await;
    let b = enrolled(&store, "b", "linux").await;
    let l1 = regular_label(&store, "one", "").await;
    let l2 = regular_label(&store, "two", "").await;

    store
        .record_label_query_executions(&a, &BTreeMap::from([(l1.id, true), (l2.id, true)]), t0())
        .await
        .unwrap();
    store
        .record_label_query_executions(&b, &BTreeMap::from([(l2.id, true)]), t0())
        .await
        .unwrap();

    let hosts = store.list_unique_hosts_in_labels(&[l1.id, l2.id]).await.unwrap();
    let ids: Vec<HostId> = hosts.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn duplicate_label_name_rejected() {
    let store = MemStore::new();
    regular_label(&store, "Linux", "").await;
    let err = store.new_label(Label::builder().name("Linux").build()).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));
}

#[tokio::test]
async fn builtin_labels_cannot_be_deleted() {
    let store = MemStore::new();
    let err = store.delete_label(LabelId::new(1)).await.unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));

    let label = regular_label(&store, "temp", "").await;
    store.delete_label(label.id).await.unwrap();
    assert!(store.label(label.id).await.unwrap_err().is_not_found());
}
