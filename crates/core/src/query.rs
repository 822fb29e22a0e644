// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries, packs of scheduled queries, agent options and decorators.

use crate::id::{DecoratorId, PackId, QueryId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Global agent options keyed by osquery flag name.
pub type OsqueryOptions = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: QueryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub query: String,
    /// Library queries are saved; campaign queries are ephemeral.
    pub saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    pub id: PackId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Per-pack overrides for how the agent schedules a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledQueryOptions {
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<u32>,
}

/// A query as scheduled within one pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledQuery {
    pub pack_id: PackId,
    pub query_id: QueryId,
    /// Name of the referenced query; keys the entry in the agent config.
    pub name: String,
    pub query: String,
    pub options: ScheduledQueryOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoratorType {
    Load,
    Always,
    Interval,
}

crate::simple_display! {
    DecoratorType {
        Load => "load",
        Always => "always",
        Interval => "interval",
    }
}

/// A query whose output the agent attaches to every log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    pub id: DecoratorId,
    pub decorator_type: DecoratorType,
    /// Seconds between runs; only meaningful for [`DecoratorType::Interval`].
    pub interval: u32,
    pub query: String,
}
