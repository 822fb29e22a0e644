// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Host, HostId, Label, LabelId, LabelType, Row};
use chrono::{DateTime, Utc};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::campaign::{ExecutionStatus, Row};
    use proptest::prelude::*;

    pub fn arb_execution_status() -> impl Strategy<Value = ExecutionStatus> {
        prop_oneof![
            Just(ExecutionStatus::Waiting),
            Just(ExecutionStatus::Requested),
            Just(ExecutionStatus::Succeeded),
            Just(ExecutionStatus::Failed),
        ]
    }

    pub fn arb_row() -> impl Strategy<Value = Row> {
        proptest::collection::btree_map("[a-z_]{1,8}", "[ -~]{0,12}", 0..6)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

/// A host with the given store id, seen at `seen`.
pub fn host(id: u64, osquery_host_id: &str, platform: &str, seen: DateTime<Utc>) -> Host {
    Host::builder()
        .id(HostId::new(id))
        .osquery_host_id(osquery_host_id)
        .node_key(format!("key-{osquery_host_id}"))
        .host_name(format!("{osquery_host_id}.local"))
        .platform(platform)
        .seen_time(seen)
        .created_at(seen)
        .build()
}

pub fn label(id: u64, name: &str, platform: &str) -> Label {
    Label::builder()
        .id(LabelId::new(id))
        .name(name)
        .query(format!("select 1 from {}", name.to_lowercase().replace(' ', "_")))
        .platform(platform)
        .label_type(LabelType::Regular)
        .build()
}

/// Build a row from `(column, value)` pairs.
pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
