// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ids_parse_from_decimal_strings() {
    let id: CampaignId = "42".parse().unwrap();
    assert_eq!(id, CampaignId::new(42));
    assert_eq!(id.to_string(), "42");
}

#[yare::parameterized(
    empty    = { "" },
    alpha    = { "abc" },
    negative = { "-1" },
    float    = { "1.5" },
)]
fn ids_reject_non_numeric(input: &str) {
    let err = input.parse::<LabelId>().unwrap_err();
    assert_eq!(err.kind, "label");
    assert_eq!(err.value, input);
}

#[test]
fn ids_serialize_as_bare_numbers() {
    let json = serde_json::to_string(&HostId::new(7)).unwrap();
    assert_eq!(json, "7");
    let parsed: HostId = serde_json::from_str("7").unwrap();
    assert_eq!(parsed.get(), 7);
}
