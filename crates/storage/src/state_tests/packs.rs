// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fleet_core::{DecoratorType, ScheduledQueryOptions};

fn saved_query(name: &str) -> Query {
    Query {
        id: QueryId::default(),
        name: name.to_string(),
        description: String::new(),
        query: format!("select * from {name}"),
        saved: true,
        author_id: None,
    }
}

fn pack(name: &str) -> Pack {
    Pack {
        id: PackId::default(),
        name: name.to_string(),
        description: String::new(),
        platform: String::new(),
        disabled: false,
    }
}

#[tokio::test]
async fn packs_follow_host_label_membership() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let label = regular_label(&store, "Linux", "linux").await;
    let p = store.new_pack(pack("monitoring")).await.unwrap();
    store.add_label_to_pack(p.id, label.id).await.unwrap();

    assert!(store.list_packs_for_host(host.id).await.unwrap().is_empty());

    store
        .record_label_query_executions(&host, &BTreeMap::from([(label.id, true)]), t0())
        .await
        .unwrap();
    assert_eq!(store.list_packs_for_host(host.id).await.unwrap(), vec![p]);
}

#[tokio::test]
async fn disabled_packs_are_not_listed() {
    let store = MemStore::new();
    let host = enrolled(&store, "h1", "linux").await;
    let label = regular_label(&store, "Linux", "linux").await;
    let p = store.new_pack(Pack { disabled: true, ..pack("off") }).await.unwrap();
    store.add_label_to_pack(p.id, label.id).await.unwrap();
    store
        .record_label_query_executions(&host, &BTreeMap::from([(label.id, true)]), t0())
        .await
        .unwrap();

    assert!(store.list_packs_for_host(host.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn scheduled_queries_carry_options() {
    let store = MemStore::new();
    let p = store.new_pack(pack("monitoring")).await.unwrap();
    let other = store.new_pack(pack("other")).await.unwrap();
    let q = store.new_query(saved_query("processes")).await.unwrap();
    let options = ScheduledQueryOptions { interval: 60, snapshot: Some(true), ..Default::default() };
    store.add_query_to_pack(p.id, q.id, options.clone()).await.unwrap();

    let scheduled = store.scheduled_queries_in_pack(p.id).await.unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].name, "processes");
    assert_eq!(scheduled[0].query, "select * from processes");
    assert_eq!(scheduled[0].options, options);
    assert!(store.scheduled_queries_in_pack(other.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn pack_operations_validate_references() {
    let store = MemStore::new();
    let err = store.add_label_to_pack(PackId::new(99), LabelId::new(1)).await.unwrap_err();
    assert!(err.is_not_found());

    let p = store.new_pack(pack("monitoring")).await.unwrap();
    let err = store
        .add_query_to_pack(p.id, QueryId::new(99), ScheduledQueryOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn saved_query_names_are_unique_but_ephemeral_are_not() {
    let store = MemStore::new();
    store.new_query(saved_query("q")).await.unwrap();
    let err = store.new_query(saved_query("q")).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }));

    let ephemeral = Query { saved: false, ..saved_query("q") };
    store.new_query(ephemeral.clone()).await.unwrap();
    store.new_query(ephemeral).await.unwrap();
}

#[tokio::test]
async fn decorators_are_listed_in_insert_order() {
    let store = MemStore::new();
    for (kind, query) in [(DecoratorType::Load, "select 1"), (DecoratorType::Always, "select 2")] {
        store
            .new_decorator(Decorator {
                id: DecoratorId::default(),
                decorator_type: kind,
                interval: 0,
                query: query.to_string(),
            })
            .await
            .unwrap();
    }
    let decorators = store.list_decorators().await.unwrap();
    assert_eq!(decorators.len(), 2);
    assert_eq!(decorators[1].decorator_type, DecoratorType::Always);
}
