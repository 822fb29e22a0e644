// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fleet_core::{CampaignId, HostId, HostIdentity, Row};

#[test]
fn auth_frame_carries_token() {
    let token = Frame::decode_auth(r#"{"type":"auth","data":{"token":"abc"}}"#).unwrap();
    assert_eq!(token, "abc");
}

#[test]
fn auth_rejects_other_frame_types() {
    let err = Frame::decode_auth(r#"{"type":"error","data":"nope"}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::Unexpected { expected: "auth", got: "error" }));
}

#[yare::parameterized(
    not_json     = { "auth" },
    missing_data = { r#"{"type":"auth"}"# },
    unknown_type = { r#"{"type":"ping","data":{}}"# },
)]
fn malformed_frames_fail(text: &str) {
    assert!(matches!(Frame::decode(text), Err(ProtocolError::Json(_))));
}

#[test]
fn result_frame_shape() {
    let mut row = Row::new();
    row.insert("a".to_string(), "1".to_string());
    let frame = Frame::Result(DistributedQueryResult {
        distributed_query_campaign_id: CampaignId::new(1),
        host: HostIdentity { id: HostId::new(2), hostname: "h".to_string() },
        rows: vec![row],
        error: None,
    });
    let value: serde_json::Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
    similar_asserts::assert_eq!(
        value,
        serde_json::json!({
            "type": "result",
            "data": {
                "distributed_query_campaign_id": 1,
                "host": {"id": 2, "hostname": "h"},
                "rows": [{"a": "1"}],
            }
        })
    );
}

#[test]
fn totals_frame_shape() {
    let metrics = TargetMetrics { total: 3, online: 2, offline: 0, missing_in_action: 1 };
    let frame = Frame::Totals(Totals::new(metrics, 5));
    let value: serde_json::Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "type": "totals",
            "data": {"count": 3, "online": 2, "offline": 0, "missing_in_action": 1, "received": 5}
        })
    );
}
