// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod campaigns;
mod hosts;
mod labels;
mod packs;
mod users;

use super::*;
use crate::StoreError;
use chrono::TimeZone;

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 1, 10, 12, 0, 0).unwrap()
}

pub(super) fn minutes(n: i64) -> chrono::Duration {
    chrono::Duration::minutes(n)
}

/// Enroll a host and set its platform.
pub(super) async fn enrolled(store: &MemStore, osquery_host_id: &str, platform: &str) -> Host {
    let mut host = store
        .enroll_host(osquery_host_id, &format!("key-{osquery_host_id}"), t0())
        .await
        .unwrap();
    host.platform = platform.to_string();
    store.save_host(&host).await.unwrap();
    host
}

pub(super) async fn regular_label(store: &MemStore, name: &str, platform: &str) -> Label {
    store
        .new_label(Label::builder().name(name).platform(platform).query("select 1").build())
        .await
        .unwrap()
}

// ── Seed data ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_store_seeds_builtin_labels() {
    let store = MemStore::new();
    let labels = store.list_labels().await.unwrap();
    let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();

    assert_eq!(names, ["All Hosts", "macOS", "Ubuntu Linux", "CentOS Linux", "MS Windows"]);
    assert!(labels.iter().all(Label::is_builtin));
}

#[tokio::test]
async fn new_store_seeds_agent_options() {
    let store = MemStore::new();
    let options = store.osquery_options().await.unwrap();
    assert_eq!(options["distributed_plugin"], serde_json::json!("tls"));

    store.set_osquery_option("distributed_interval", serde_json::json!(30)).await.unwrap();
    assert_eq!(store.osquery_options().await.unwrap()["distributed_interval"], serde_json::json!(30));
}

#[tokio::test]
async fn health_check_is_ok() {
    assert_eq!(MemStore::new().health_check().await, Ok(()));
}

#[test]
fn not_found_helper_classifies() {
    let err = StoreError::not_found("host", 3);
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "host 3 not found");
}
