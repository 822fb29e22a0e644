// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory datastore

mod campaigns;
mod hosts;
mod labels;
mod queries;
mod seed;
mod users;

use crate::{Datastore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::{
    CampaignId, Decorator, DecoratorId, DistributedQueryCampaign, DistributedQueryExecution,
    ExecutionStatus, Host, HostId, HostSummary, Label, LabelId, LabelMembership, OsqueryOptions,
    Pack, PackId, Query, QueryId, ScheduledQuery, ScheduledQueryOptions, Session, SessionId,
    Target, User, UserId,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// All tables, guarded together by [`MemStore`]'s lock.
#[derive(Debug, Default)]
pub(crate) struct MemState {
    next_ids: HashMap<&'static str, u64>,
    hosts: BTreeMap<HostId, Host>,
    labels: BTreeMap<LabelId, Label>,
    memberships: HashMap<(HostId, LabelId), LabelMembership>,
    queries: BTreeMap<QueryId, Query>,
    packs: BTreeMap<PackId, Pack>,
    pack_targets: BTreeSet<(PackId, LabelId)>,
    pack_queries: BTreeMap<(PackId, QueryId), ScheduledQueryOptions>,
    options: OsqueryOptions,
    decorators: BTreeMap<DecoratorId, Decorator>,
    campaigns: BTreeMap<CampaignId, DistributedQueryCampaign>,
    campaign_targets: BTreeMap<CampaignId, BTreeSet<Target>>,
    executions: BTreeMap<(HostId, CampaignId), DistributedQueryExecution>,
    users: BTreeMap<UserId, User>,
    sessions: BTreeMap<SessionId, Session>,
}

impl MemState {
    /// Next monotonic id for a table, starting at 1.
    fn next_id(&mut self, kind: &'static str) -> u64 {
        let next = self.next_ids.entry(kind).or_insert(0);
        *next += 1;
        *next
    }
}

/// Process-local [`Datastore`] backed by ordered maps under one mutex.
///
/// Every operation takes the lock once, so multi-row writes such as
/// [`Datastore::record_label_query_executions`] are atomic.
#[derive(Debug)]
pub struct MemStore {
    state: Mutex<MemState>,
}

impl MemStore {
    /// An empty store seeded with the builtin labels and default agent options.
    pub fn new() -> Self {
        let mut state = MemState::default();
        seed::builtin_labels(&mut state);
        seed::default_options(&mut state);
        Self { state: Mutex::new(state) }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Datastore for MemStore {
    async fn enroll_host(
        &self,
        osquery_host_id: &str,
        node_key: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Host> {
        self.state.lock().enroll_host(osquery_host_id, node_key, now)
    }

    async fn authenticate_host(&self, node_key: &str) -> StoreResult<Host> {
        self.state.lock().authenticate_host(node_key)
    }

    async fn new_host(&self, host: Host) -> StoreResult<Host> {
        self.state.lock().new_host(host)
    }

    async fn save_host(&self, host: &Host) -> StoreResult<()> {
        self.state.lock().save_host(host)
    }

    async fn update_host_details(&self, reported: &Host) -> StoreResult<()> {
        self.state.lock().update_host_details(reported)
    }

    async fn host(&self, id: HostId) -> StoreResult<Host> {
        self.state.lock().host(id)
    }

    async fn list_hosts(&self) -> StoreResult<Vec<Host>> {
        Ok(self.state.lock().hosts.values().cloned().collect())
    }

    async fn delete_host(&self, id: HostId) -> StoreResult<()> {
        self.state.lock().delete_host(id)
    }

    async fn mark_host_seen(&self, id: HostId, seen: DateTime<Utc>) -> StoreResult<()> {
        self.state.lock().mark_host_seen(id, seen)
    }

    async fn host_status_summary(&self, now: DateTime<Utc>) -> StoreResult<HostSummary> {
        Ok(self.state.lock().host_status_summary(now))
    }

    async fn new_label(&self, label: Label) -> StoreResult<Label> {
        self.state.lock().new_label(label)
    }

    async fn label(&self, id: LabelId) -> StoreResult<Label> {
        self.state.lock().label(id)
    }

    async fn list_labels(&self) -> StoreResult<Vec<Label>> {
        Ok(self.state.lock().labels.values().cloned().collect())
    }

    async fn delete_label(&self, id: LabelId) -> StoreResult<()> {
        self.state.lock().delete_label(id)
    }

    async fn label_queries_for_host(
        &self,
        host: &Host,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<BTreeMap<LabelId, String>> {
        Ok(self.state.lock().label_queries_for_host(host, cutoff))
    }

    async fn record_label_query_executions(
        &self,
        host: &Host,
        results: &BTreeMap<LabelId, bool>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.state.lock().record_label_query_executions(host, results, updated_at)
    }

    async fn list_labels_for_host(&self, host_id: HostId) -> StoreResult<Vec<Label>> {
        Ok(self.state.lock().list_labels_for_host(host_id))
    }

    async fn list_hosts_in_label(&self, label_id: LabelId) -> StoreResult<Vec<Host>> {
        Ok(self.state.lock().list_unique_hosts_in_labels(&[label_id]))
    }

    async fn list_unique_hosts_in_labels(&self, label_ids: &[LabelId]) -> StoreResult<Vec<Host>> {
        Ok(self.state.lock().list_unique_hosts_in_labels(label_ids))
    }

    async fn new_query(&self, query: Query) -> StoreResult<Query> {
        self.state.lock().new_query(query)
    }

    async fn query(&self, id: QueryId) -> StoreResult<Query> {
        self.state.lock().query(id)
    }

    async fn new_pack(&self, pack: Pack) -> StoreResult<Pack> {
        self.state.lock().new_pack(pack)
    }

    async fn add_label_to_pack(&self, pack_id: PackId, label_id: LabelId) -> StoreResult<()> {
        self.state.lock().add_label_to_pack(pack_id, label_id)
    }

    async fn add_query_to_pack(
        &self,
        pack_id: PackId,
        query_id: QueryId,
        options: ScheduledQueryOptions,
    ) -> StoreResult<()> {
        self.state.lock().add_query_to_pack(pack_id, query_id, options)
    }

    async fn list_packs_for_host(&self, host_id: HostId) -> StoreResult<Vec<Pack>> {
        Ok(self.state.lock().list_packs_for_host(host_id))
    }

    async fn scheduled_queries_in_pack(&self, pack_id: PackId) -> StoreResult<Vec<ScheduledQuery>> {
        self.state.lock().scheduled_queries_in_pack(pack_id)
    }

    async fn osquery_options(&self) -> StoreResult<OsqueryOptions> {
        Ok(self.state.lock().options.clone())
    }

    async fn set_osquery_option(&self, name: &str, value: serde_json::Value) -> StoreResult<()> {
        self.state.lock().options.insert(name.to_string(), value);
        Ok(())
    }

    async fn new_decorator(&self, decorator: Decorator) -> StoreResult<Decorator> {
        Ok(self.state.lock().new_decorator(decorator))
    }

    async fn list_decorators(&self) -> StoreResult<Vec<Decorator>> {
        Ok(self.state.lock().decorators.values().cloned().collect())
    }

    async fn new_campaign(
        &self,
        campaign: DistributedQueryCampaign,
    ) -> StoreResult<DistributedQueryCampaign> {
        self.state.lock().new_campaign(campaign)
    }

    async fn campaign(&self, id: CampaignId) -> StoreResult<DistributedQueryCampaign> {
        self.state.lock().campaign(id)
    }

    async fn save_campaign(&self, campaign: &DistributedQueryCampaign) -> StoreResult<()> {
        self.state.lock().save_campaign(campaign)
    }

    async fn delete_campaign(&self, id: CampaignId) -> StoreResult<()> {
        self.state.lock().delete_campaign(id)
    }

    async fn new_campaign_target(&self, campaign_id: CampaignId, target: Target) -> StoreResult<()> {
        self.state.lock().new_campaign_target(campaign_id, target)
    }

    async fn campaign_target_ids(
        &self,
        campaign_id: CampaignId,
    ) -> StoreResult<(Vec<HostId>, Vec<LabelId>)> {
        self.state.lock().campaign_target_ids(campaign_id)
    }

    async fn new_distributed_query_execution(
        &self,
        execution: DistributedQueryExecution,
    ) -> StoreResult<DistributedQueryExecution> {
        self.state.lock().new_distributed_query_execution(execution)
    }

    async fn distributed_query_execution(
        &self,
        host_id: HostId,
        campaign_id: CampaignId,
    ) -> StoreResult<DistributedQueryExecution> {
        self.state.lock().distributed_query_execution(host_id, campaign_id)
    }

    async fn update_execution(
        &self,
        host_id: HostId,
        campaign_id: CampaignId,
        status: ExecutionStatus,
        error: Option<String>,
    ) -> StoreResult<DistributedQueryExecution> {
        self.state.lock().update_execution(host_id, campaign_id, status, error)
    }

    async fn distributed_queries_for_host(
        &self,
        host: &Host,
    ) -> StoreResult<BTreeMap<CampaignId, String>> {
        Ok(self.state.lock().distributed_queries_for_host(host))
    }

    async fn new_user(&self, user: User) -> StoreResult<User> {
        self.state.lock().new_user(user)
    }

    async fn user(&self, id: UserId) -> StoreResult<User> {
        self.state.lock().user(id)
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        self.state.lock().save_user(user)
    }

    async fn new_session(&self, user_id: UserId, key: &str, now: DateTime<Utc>) -> StoreResult<Session> {
        self.state.lock().new_session(user_id, key, now)
    }

    async fn session_by_key(&self, key: &str) -> StoreResult<Session> {
        self.state.lock().session_by_key(key)
    }

    async fn mark_session_accessed(&self, id: SessionId, at: DateTime<Utc>) -> StoreResult<()> {
        self.state.lock().mark_session_accessed(id, at)
    }

    async fn delete_session(&self, id: SessionId) -> StoreResult<()> {
        self.state.lock().delete_session(id)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../state_tests/mod.rs"]
mod tests;
