// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn write_request_accepts_numeric_and_string_statuses() {
    let json = r#"{
        "node_key": "k",
        "queries": {"kolide_distributed_query_1": [{"a": "1"}]},
        "statuses": {"kolide_distributed_query_1": 0, "kolide_distributed_query_2": "1"}
    }"#;
    let req: DistributedWriteRequest = serde_json::from_str(json).unwrap();

    assert_eq!(req.node_key(), "k");
    assert_eq!(req.statuses["kolide_distributed_query_1"], "0");
    assert_eq!(req.statuses["kolide_distributed_query_2"], "1");
    assert_eq!(req.queries["kolide_distributed_query_1"][0]["a"], "1");
}

#[test]
fn write_request_defaults_missing_maps() {
    let req: DistributedWriteRequest = serde_json::from_str(r#"{"node_key":"k"}"#).unwrap();
    assert!(req.queries.is_empty());
    assert!(req.statuses.is_empty());
}

#[test]
fn read_response_omits_absent_accelerate() {
    let resp = DistributedReadResponse::default();
    assert_eq!(serde_json::to_string(&resp).unwrap(), r#"{"queries":{}}"#);

    let resp = DistributedReadResponse { accelerate: Some(60), ..Default::default() };
    assert_eq!(serde_json::to_string(&resp).unwrap(), r#"{"queries":{},"accelerate":60}"#);
}

#[test]
fn agent_error_flags_node_invalid() {
    let body = AgentError { error: "invalid node key".to_string(), node_invalid: true };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        serde_json::json!({"error": "invalid node key", "node_invalid": true})
    );

    let body = AgentError { error: "store down".to_string(), node_invalid: false };
    assert_eq!(serde_json::to_value(&body).unwrap(), serde_json::json!({"error": "store down"}));
}

#[yare::parameterized(
    status = { "status", LogType::Status },
    result = { "result", LogType::Result },
)]
fn log_request_parses_type(name: &str, expected: LogType) {
    let json = format!(r#"{{"node_key":"k","log_type":"{name}","data":[{{"x":1}}]}}"#);
    let req: LogRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(req.log_type, expected);
    assert_eq!(req.data.len(), 1);
    assert_eq!(req.log_type.to_string(), name);
}

#[test]
fn log_request_rejects_unknown_type() {
    let json = r#"{"node_key":"k","log_type":"metrics","data":[]}"#;
    assert!(serde_json::from_str::<LogRequest>(json).is_err());
}

#[test]
fn config_omits_empty_decorators() {
    let mut config = OsqueryConfig::default();
    config.options.insert("distributed_interval".to_string(), serde_json::json!(10));
    similar_asserts::assert_eq!(
        serde_json::to_value(&config).unwrap(),
        serde_json::json!({"options": {"distributed_interval": 10}, "packs": {}})
    );
}
