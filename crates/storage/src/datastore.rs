// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed contract every backing store implements.

use crate::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::{
    CampaignId, Decorator, DistributedQueryCampaign, DistributedQueryExecution, ExecutionStatus,
    Host, HostId, HostSummary, Label, LabelId, OsqueryOptions, Pack, PackId, Query, QueryId,
    ScheduledQuery, ScheduledQueryOptions, Session, SessionId, Target, User, UserId,
};
use std::collections::BTreeMap;

/// Persistent state behind the control plane.
///
/// Implementations synchronize internally and are shared across request
/// tasks behind an `Arc<dyn Datastore>`.
#[async_trait]
pub trait Datastore: Send + Sync {
    // ── Hosts ───────────────────────────────────────────────────────────

    /// Create or update the host identified by `osquery_host_id`, storing
    /// `node_key` as its only valid credential.
    ///
    /// Fails `AlreadyExists` if another host holds `node_key`.
    async fn enroll_host(
        &self,
        osquery_host_id: &str,
        node_key: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Host>;

    /// Resolve a node key. Fails `NotFound` for unknown or rotated keys.
    async fn authenticate_host(&self, node_key: &str) -> StoreResult<Host>;

    async fn new_host(&self, host: Host) -> StoreResult<Host>;
    async fn save_host(&self, host: &Host) -> StoreResult<()>;

    /// Apply the agent-reported fields of `reported` to the stored host.
    ///
    /// The stored credential and identity are never overwritten.
    async fn update_host_details(&self, reported: &Host) -> StoreResult<()>;
    async fn host(&self, id: HostId) -> StoreResult<Host>;
    async fn list_hosts(&self) -> StoreResult<Vec<Host>>;

    /// Remove a host with its label memberships and campaign executions.
    async fn delete_host(&self, id: HostId) -> StoreResult<()>;

    async fn mark_host_seen(&self, id: HostId, seen: DateTime<Utc>) -> StoreResult<()>;
    async fn host_status_summary(&self, now: DateTime<Utc>) -> StoreResult<HostSummary>;

    // ── Labels ──────────────────────────────────────────────────────────

    async fn new_label(&self, label: Label) -> StoreResult<Label>;
    async fn label(&self, id: LabelId) -> StoreResult<Label>;
    async fn list_labels(&self) -> StoreResult<Vec<Label>>;

    /// Fails `Invalid` for builtin labels.
    async fn delete_label(&self, id: LabelId) -> StoreResult<()>;

    /// Labels whose platform filter matches `host` and that the host has not
    /// evaluated at or after `cutoff`.
    async fn label_queries_for_host(
        &self,
        host: &Host,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<BTreeMap<LabelId, String>>;

    /// Upsert one membership row per entry, all under one lock.
    async fn record_label_query_executions(
        &self,
        host: &Host,
        results: &BTreeMap<LabelId, bool>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Labels the host currently matches.
    async fn list_labels_for_host(&self, host_id: HostId) -> StoreResult<Vec<Label>>;
    async fn list_hosts_in_label(&self, label_id: LabelId) -> StoreResult<Vec<Host>>;
    async fn list_unique_hosts_in_labels(&self, label_ids: &[LabelId]) -> StoreResult<Vec<Host>>;

    // ── Queries, packs, options ─────────────────────────────────────────

    /// Saved queries must have unique names.
    async fn new_query(&self, query: Query) -> StoreResult<Query>;
    async fn query(&self, id: QueryId) -> StoreResult<Query>;

    async fn new_pack(&self, pack: Pack) -> StoreResult<Pack>;
    async fn add_label_to_pack(&self, pack_id: PackId, label_id: LabelId) -> StoreResult<()>;
    async fn add_query_to_pack(
        &self,
        pack_id: PackId,
        query_id: QueryId,
        options: ScheduledQueryOptions,
    ) -> StoreResult<()>;

    /// Enabled packs targeting at least one label the host matches.
    async fn list_packs_for_host(&self, host_id: HostId) -> StoreResult<Vec<Pack>>;
    async fn scheduled_queries_in_pack(&self, pack_id: PackId) -> StoreResult<Vec<ScheduledQuery>>;

    async fn osquery_options(&self) -> StoreResult<OsqueryOptions>;
    async fn set_osquery_option(&self, name: &str, value: serde_json::Value) -> StoreResult<()>;

    async fn new_decorator(&self, decorator: Decorator) -> StoreResult<Decorator>;
    async fn list_decorators(&self) -> StoreResult<Vec<Decorator>>;

    // ── Campaigns ───────────────────────────────────────────────────────

    async fn new_campaign(&self, campaign: DistributedQueryCampaign)
        -> StoreResult<DistributedQueryCampaign>;
    async fn campaign(&self, id: CampaignId) -> StoreResult<DistributedQueryCampaign>;
    async fn save_campaign(&self, campaign: &DistributedQueryCampaign) -> StoreResult<()>;

    /// Remove a campaign with its targets and executions.
    async fn delete_campaign(&self, id: CampaignId) -> StoreResult<()>;

    async fn new_campaign_target(&self, campaign_id: CampaignId, target: Target) -> StoreResult<()>;

    /// Explicit host ids and label ids selected for the campaign.
    async fn campaign_target_ids(
        &self,
        campaign_id: CampaignId,
    ) -> StoreResult<(Vec<HostId>, Vec<LabelId>)>;

    /// Insert or replace the row keyed by `(host_id, campaign_id)`.
    async fn new_distributed_query_execution(
        &self,
        execution: DistributedQueryExecution,
    ) -> StoreResult<DistributedQueryExecution>;

    async fn distributed_query_execution(
        &self,
        host_id: HostId,
        campaign_id: CampaignId,
    ) -> StoreResult<DistributedQueryExecution>;

    /// Move an execution forward.
    ///
    /// Re-applying the current terminal status is a no-op; any other
    /// non-forward move fails `Conflict`.
    async fn update_execution(
        &self,
        host_id: HostId,
        campaign_id: CampaignId,
        status: ExecutionStatus,
        error: Option<String>,
    ) -> StoreResult<DistributedQueryExecution>;

    /// Running campaigns holding a `waiting` execution for this host,
    /// mapped to their query text.
    async fn distributed_queries_for_host(
        &self,
        host: &Host,
    ) -> StoreResult<BTreeMap<CampaignId, String>>;

    // ── Users and sessions ──────────────────────────────────────────────

    async fn new_user(&self, user: User) -> StoreResult<User>;
    async fn user(&self, id: UserId) -> StoreResult<User>;
    async fn save_user(&self, user: &User) -> StoreResult<()>;

    async fn new_session(&self, user_id: UserId, key: &str, now: DateTime<Utc>) -> StoreResult<Session>;
    async fn session_by_key(&self, key: &str) -> StoreResult<Session>;
    async fn mark_session_accessed(&self, id: SessionId, at: DateTime<Utc>) -> StoreResult<()>;
    async fn delete_session(&self, id: SessionId) -> StoreResult<()>;

    /// Check that the backing store responds.
    async fn health_check(&self) -> StoreResult<()>;
}
