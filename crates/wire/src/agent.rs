// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-facing request and response bodies.

use fleet_core::{OsqueryOptions, Row};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Every authenticated agent request carries its node key.
pub trait HasNodeKey {
    fn node_key(&self) -> &str;
}

macro_rules! has_node_key {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HasNodeKey for $ty {
                fn node_key(&self) -> &str {
                    &self.node_key
                }
            }
        )+
    };
}

has_node_key!(ConfigRequest, DistributedReadRequest, DistributedWriteRequest, LogRequest);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollRequest {
    #[serde(default)]
    pub enroll_secret: String,
    #[serde(default)]
    pub host_identifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollResponse {
    pub node_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_invalid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body returned for any agent request that fails.
///
/// `node_invalid: true` tells the agent to re-enroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentError {
    pub error: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub node_invalid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    #[serde(default)]
    pub node_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContent {
    pub query: String,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub queries: BTreeMap<String, QueryContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decorators {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub always: Vec<String>,
    /// Interval in seconds (as a string key) to queries run on that interval.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub interval: BTreeMap<String, Vec<String>>,
}

impl Decorators {
    pub fn is_empty(&self) -> bool {
        self.load.is_empty() && self.always.is_empty() && self.interval.is_empty()
    }
}

/// Configuration served to an agent on each config poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsqueryConfig {
    pub options: OsqueryOptions,
    #[serde(default, skip_serializing_if = "Decorators::is_empty")]
    pub decorators: Decorators,
    #[serde(default)]
    pub packs: BTreeMap<String, PackContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributedReadRequest {
    #[serde(default)]
    pub node_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributedReadResponse {
    pub queries: BTreeMap<String, String>,
    /// Seconds the agent should poll faster for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerate: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributedWriteRequest {
    #[serde(default)]
    pub node_key: String,
    #[serde(default)]
    pub queries: BTreeMap<String, Vec<Row>>,
    /// Per-query status; agents send either numbers or strings.
    #[serde(default, deserialize_with = "status_strings")]
    pub statuses: BTreeMap<String, String>,
}

fn status_strings<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Text(String),
        Number(i64),
    }

    let raw = BTreeMap::<String, Status>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, status)| {
            let text = match status {
                Status::Text(s) => s,
                Status::Number(n) => n.to_string(),
            };
            (name, text)
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Status,
    Result,
}

fleet_core::simple_display! {
    LogType {
        Status => "status",
        Result => "result",
    }
}

/// A batch of log records. Records are opaque to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    #[serde(default)]
    pub node_key: String,
    pub log_type: LogType,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
