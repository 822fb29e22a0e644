// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the agent protocol and the operator API.
//!
//! Agent endpoints speak the osquery TLS remote protocol (JSON over HTTP
//! POST). Live query sessions exchange `{"type": ..., "data": ...}` frames
//! over a websocket.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod agent;
mod frame;
mod operator;
mod prefix;

pub use agent::{
    AgentError, ConfigRequest, Decorators, DistributedReadRequest, DistributedReadResponse,
    DistributedWriteRequest, EnrollRequest, EnrollResponse, HasNodeKey, LogRequest, LogType,
    OsqueryConfig, PackContent, QueryContent,
};
pub use frame::{Frame, ProtocolError, Totals};
pub use operator::{
    CampaignResponse, FieldError, HealthResponse, HostTarget, RunQueryRequest, SearchTargetsRequest,
    SearchTargetsResponse, TargetMatches, TargetSelection, UserResponse, ValidationErrorBody,
};
pub use prefix::{QueryKey, CAMPAIGN_QUERY_PREFIX, DETAIL_QUERY_PREFIX, LABEL_QUERY_PREFIX};
