// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rows every fresh store starts with.

use fleet_core::{Label, LabelId, LabelType};
use serde_json::json;

use super::MemState;

const BUILTIN_LABELS: &[(&str, &str, &str)] = &[
    ("All Hosts", "", "select 1;"),
    ("macOS", "darwin", "select 1 from osquery_info where build_platform = 'darwin';"),
    ("Ubuntu Linux", "ubuntu", "select 1 from osquery_info where build_platform = 'ubuntu';"),
    ("CentOS Linux", "centos", "select 1 from osquery_info where build_platform = 'centos';"),
    ("MS Windows", "windows", "select 1 from osquery_info where build_platform = 'windows';"),
];

pub(super) fn builtin_labels(state: &mut MemState) {
    for (name, platform, query) in BUILTIN_LABELS {
        let id = LabelId::new(state.next_id(LabelId::KIND));
        state.labels.insert(
            id,
            Label {
                id,
                name: name.to_string(),
                description: String::new(),
                query: query.to_string(),
                platform: platform.to_string(),
                label_type: LabelType::Builtin,
            },
        );
    }
}

pub(super) fn default_options(state: &mut MemState) {
    let defaults = [
        ("distributed_interval", json!(10)),
        ("distributed_plugin", json!("tls")),
        ("distributed_tls_max_attempts", json!(3)),
        ("config_tls_refresh", json!(10)),
        ("logger_plugin", json!("tls")),
        ("logger_tls_period", json!(10)),
        ("pack_delimiter", json!("/")),
        ("disable_distributed", json!(false)),
    ];
    for (name, value) in defaults {
        state.options.insert(name.to_string(), value);
    }
}
