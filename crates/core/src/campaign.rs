// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed query campaigns: targets, per-host executions, and the
//! result rows streamed back to operators.

use crate::id::{CampaignId, HostId, LabelId, QueryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One result row as reported by the agent.
pub type Row = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Running,
    Complete,
    Error,
}

crate::simple_display! {
    CampaignStatus {
        Running => "running",
        Complete => "complete",
        Error => "error",
    }
}

impl CampaignStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CampaignStatus::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributedQueryCampaign {
    pub id: CampaignId,
    pub query_id: QueryId,
    pub user_id: UserId,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
}

/// A target selected when the campaign was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "target_id", rename_all = "lowercase")]
pub enum Target {
    Host(HostId),
    Label(LabelId),
}

/// Lifecycle of one host's part in a campaign.
///
/// Moves strictly forward: `waiting -> requested -> succeeded | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Waiting,
    Requested,
    Succeeded,
    Failed,
}

crate::simple_display! {
    ExecutionStatus {
        Waiting => "waiting",
        Requested => "requested",
        Succeeded => "succeeded",
        Failed => "failed",
    }
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Succeeded | ExecutionStatus::Failed)
    }

    pub fn can_transition_to(self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        matches!(
            (self, next),
            (Waiting, Requested) | (Requested, Succeeded) | (Requested, Failed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributedQueryExecution {
    pub host_id: HostId,
    pub campaign_id: CampaignId,
    pub status: ExecutionStatus,
    pub error: Option<String>,
    pub execution_duration: Duration,
}

impl DistributedQueryExecution {
    pub fn waiting(host_id: HostId, campaign_id: CampaignId) -> Self {
        Self {
            host_id,
            campaign_id,
            status: ExecutionStatus::Waiting,
            error: None,
            execution_duration: Duration::ZERO,
        }
    }
}

/// Who produced a result row, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub id: HostId,
    pub hostname: String,
}

/// Rows returned by one host for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributedQueryResult {
    pub distributed_query_campaign_id: CampaignId,
    pub host: HostIdentity,
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Host counts over a campaign's target closure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMetrics {
    pub total: u64,
    pub online: u64,
    pub offline: u64,
    pub missing_in_action: u64,
}

#[cfg(test)]
#[path = "campaign_tests.rs"]
mod tests;
