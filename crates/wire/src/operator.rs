// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator API request and response bodies.

use fleet_core::{DistributedQueryCampaign, HostId, HostStatus, Label, LabelId, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSelection {
    #[serde(default)]
    pub hosts: Vec<HostId>,
    #[serde(default)]
    pub labels: Vec<LabelId>,
}

impl TargetSelection {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunQueryRequest {
    pub query: String,
    #[serde(default)]
    pub selected: TargetSelection,
}

/// Target picker search; already selected targets are omitted from matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTargetsRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub selected: TargetSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTarget {
    pub id: HostId,
    pub host_name: String,
    pub platform: String,
    pub primary_ip: String,
    pub status: HostStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMatches {
    pub hosts: Vec<HostTarget>,
    pub labels: Vec<Label>,
}

/// Matches plus host counts over the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTargetsResponse {
    pub targets: TargetMatches,
    pub targets_count: u64,
    pub targets_online: u64,
    pub targets_offline: u64,
    pub targets_missing_in_action: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignResponse {
    pub campaign: DistributedQueryCampaign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub name: String,
    pub reason: String,
}

/// Body of a 422 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub message: String,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub store: bool,
    pub bus: bool,
}
