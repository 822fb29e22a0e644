// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Campaigns, their targets, and per-host executions.

use fleet_core::{
    CampaignId, CampaignStatus, DistributedQueryCampaign, DistributedQueryExecution,
    ExecutionStatus, Host, HostId, LabelId, Target,
};
use std::collections::BTreeMap;

use super::MemState;
use crate::{StoreError, StoreResult};

const EXECUTION: &str = "execution";

impl MemState {
    pub(super) fn new_campaign(
        &mut self,
        mut campaign: DistributedQueryCampaign,
    ) -> StoreResult<DistributedQueryCampaign> {
        if !self.queries.contains_key(&campaign.query_id) {
            return Err(StoreError::not_found("query", campaign.query_id));
        }
        campaign.id = CampaignId::new(self.next_id(CampaignId::KIND));
        self.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    pub(super) fn campaign(&self, id: CampaignId) -> StoreResult<DistributedQueryCampaign> {
        self.campaigns.get(&id).cloned().ok_or_else(|| StoreError::not_found(CampaignId::KIND, id))
    }

    pub(super) fn save_campaign(&mut self, campaign: &DistributedQueryCampaign) -> StoreResult<()> {
        let slot = self
            .campaigns
            .get_mut(&campaign.id)
            .ok_or_else(|| StoreError::not_found(CampaignId::KIND, campaign.id))?;
        *slot = campaign.clone();
        Ok(())
    }

    pub(super) fn delete_campaign(&mut self, id: CampaignId) -> StoreResult<()> {
        if self.campaigns.remove(&id).is_none() {
            return Err(StoreError::not_found(CampaignId::KIND, id));
        }
        self.campaign_targets.remove(&id);
        self.executions.retain(|(_, campaign_id), _| *campaign_id != id);
        Ok(())
    }

    pub(super) fn new_campaign_target(&mut self, campaign_id: CampaignId, target: Target) -> StoreResult<()> {
        if !self.campaigns.contains_key(&campaign_id) {
            return Err(StoreError::not_found(CampaignId::KIND, campaign_id));
        }
        self.campaign_targets.entry(campaign_id).or_default().insert(target);
        Ok(())
    }

    pub(super) fn campaign_target_ids(
        &self,
        campaign_id: CampaignId,
    ) -> StoreResult<(Vec<HostId>, Vec<LabelId>)> {
        if !self.campaigns.contains_key(&campaign_id) {
            return Err(StoreError::not_found(CampaignId::KIND, campaign_id));
        }
        let mut hosts = Vec::new();
        let mut labels = Vec::new();
        for target in self.campaign_targets.get(&campaign_id).into_iter().flatten() {
            match target {
                Target::Host(id) => hosts.push(*id),
                Target::Label(id) => labels.push(*id),
            }
        }
        Ok((hosts, labels))
    }

    pub(super) fn new_distributed_query_execution(
        &mut self,
        execution: DistributedQueryExecution,
    ) -> StoreResult<DistributedQueryExecution> {
        if !self.campaigns.contains_key(&execution.campaign_id) {
            return Err(StoreError::not_found(CampaignId::KIND, execution.campaign_id));
        }
        if !self.hosts.contains_key(&execution.host_id) {
            return Err(StoreError::not_found(HostId::KIND, execution.host_id));
        }
        self.executions.insert((execution.host_id, execution.campaign_id), execution.clone());
        Ok(execution)
    }

    pub(super) fn distributed_query_execution(
        &self,
        host_id: HostId,
        campaign_id: CampaignId,
    ) -> StoreResult<DistributedQueryExecution> {
        self.executions
            .get(&(host_id, campaign_id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(EXECUTION, format!("{host_id}/{campaign_id}")))
    }

    pub(super) fn update_execution(
        &mut self,
        host_id: HostId,
        campaign_id: CampaignId,
        status: ExecutionStatus,
        error: Option<String>,
    ) -> StoreResult<DistributedQueryExecution> {
        let execution = self
            .executions
            .get_mut(&(host_id, campaign_id))
            .ok_or_else(|| StoreError::not_found(EXECUTION, format!("{host_id}/{campaign_id}")))?;

        if execution.status == status && status.is_terminal() {
            return Ok(execution.clone());
        }
        if !execution.status.can_transition_to(status) {
            return Err(StoreError::Conflict(format!(
                "execution {host_id}/{campaign_id} cannot move from {} to {status}",
                execution.status
            )));
        }
        execution.status = status;
        execution.error = error;
        Ok(execution.clone())
    }

    pub(super) fn distributed_queries_for_host(&self, host: &Host) -> BTreeMap<CampaignId, String> {
        self.campaigns
            .values()
            .filter(|c| c.status == CampaignStatus::Running)
            .filter(|c| {
                self.executions
                    .get(&(host.id, c.id))
                    .is_some_and(|e| e.status == ExecutionStatus::Waiting)
            })
            .filter_map(|c| self.queries.get(&c.query_id).map(|q| (c.id, q.query.clone())))
            .collect()
    }
}
