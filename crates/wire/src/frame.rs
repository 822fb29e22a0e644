// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live query websocket frames.
//!
//! Wire format: one JSON text message per frame, `{"type": ..., "data": ...}`.

use fleet_core::{DistributedQueryResult, TargetMetrics};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} frame, got {got}")]
    Unexpected { expected: &'static str, got: &'static str },
}

/// Progress over a campaign's target closure, sent once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub count: u64,
    pub online: u64,
    pub offline: u64,
    pub missing_in_action: u64,
    /// Result frames this session has forwarded so far.
    pub received: u64,
}

impl Totals {
    pub fn new(metrics: TargetMetrics, received: u64) -> Self {
        Self {
            count: metrics.total,
            online: metrics.online,
            offline: metrics.offline,
            missing_in_action: metrics.missing_in_action,
            received,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Frame {
    /// First client frame: the operator's session token.
    Auth { token: String },
    Result(DistributedQueryResult),
    Totals(Totals),
    Error(String),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Auth { .. } => "auth",
            Frame::Result(_) => "result",
            Frame::Totals(_) => "totals",
            Frame::Error(_) => "error",
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode a frame that must be an auth frame and return its token.
    pub fn decode_auth(text: &str) -> Result<String, ProtocolError> {
        match Self::decode(text)? {
            Frame::Auth { token } => Ok(token),
            other => Err(ProtocolError::Unexpected { expected: "auth", got: other.kind() }),
        }
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
