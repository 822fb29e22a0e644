// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live query campaigns: creation, target closure, and completion.

use std::collections::BTreeSet;

use fleet_core::{
    CampaignId, CampaignStatus, DistributedQueryCampaign, DistributedQueryExecution, HostId, LabelId,
    HostStatus, Query, QueryId, Target, TargetMetrics,
};
use fleet_wire::TargetSelection;
use tracing::{info, warn};

use super::{InvalidArguments, Service, ServiceError, ServiceResult, StoreContext, Viewer};

impl Service {
    /// Start a campaign running `query` on the selected hosts and labels.
    ///
    /// The target closure is resolved now: every host selected directly or
    /// currently matching a selected label gets a `waiting` execution.
    /// Hosts joining a label later are not added.
    pub async fn new_distributed_query_campaign(
        &self,
        viewer: &Viewer,
        query: &str,
        selected: &TargetSelection,
    ) -> ServiceResult<DistributedQueryCampaign> {
        let mut invalid = InvalidArguments::default();
        if query.trim().is_empty() {
            invalid.push("query", "query may not be empty");
        }
        if selected.is_empty() {
            invalid.push("targets", "at least one host or label must be selected");
        }
        for &host_id in &selected.hosts {
            if let Err(e) = self.store.host(host_id).await {
                if !e.is_not_found() {
                    return Err(ServiceError::from(e));
                }
                invalid.push("hosts", format!("unknown host {host_id}"));
            }
        }
        for &label_id in &selected.labels {
            if let Err(e) = self.store.label(label_id).await {
                if !e.is_not_found() {
                    return Err(ServiceError::from(e));
                }
                invalid.push("labels", format!("unknown label {label_id}"));
            }
        }
        invalid.into_result()?;

        let query = self
            .store
            .new_query(Query {
                id: QueryId::default(),
                name: query.to_string(),
                description: String::new(),
                query: query.to_string(),
                saved: false,
                author_id: Some(viewer.user_id()),
            })
            .await
            .context("create campaign query")?;

        let campaign = self
            .store
            .new_campaign(DistributedQueryCampaign {
                id: CampaignId::default(),
                query_id: query.id,
                user_id: viewer.user_id(),
                status: CampaignStatus::Running,
                created_at: self.clock.now(),
            })
            .await
            .context("create campaign")?;

        let targets = selected
            .hosts
            .iter()
            .map(|&id| Target::Host(id))
            .chain(selected.labels.iter().map(|&id| Target::Label(id)));
        for target in targets {
            self.store.new_campaign_target(campaign.id, target).await.context("add campaign target")?;
        }

        let closure = self.target_closure(&selected.hosts, &selected.labels).await?;
        for &host_id in &closure {
            self.store
                .new_distributed_query_execution(DistributedQueryExecution::waiting(host_id, campaign.id))
                .await
                .context("create execution")?;
        }

        info!(
            campaign_id = %campaign.id,
            user_id = %viewer.user_id(),
            hosts = closure.len(),
            "campaign started"
        );
        Ok(campaign)
    }

    async fn target_closure(
        &self,
        host_ids: &[HostId],
        label_ids: &[LabelId],
    ) -> ServiceResult<BTreeSet<HostId>> {
        let mut closure: BTreeSet<HostId> = host_ids.iter().copied().collect();
        if !label_ids.is_empty() {
            let members =
                self.store.list_unique_hosts_in_labels(label_ids).await.context("list label hosts")?;
            closure.extend(members.into_iter().map(|h| h.id));
        }
        Ok(closure)
    }

    /// Online/offline/MIA counts over the deduplicated target set.
    pub async fn count_hosts_in_targets(
        &self,
        host_ids: &[HostId],
        label_ids: &[LabelId],
    ) -> ServiceResult<TargetMetrics> {
        let now = self.clock.now();
        let mut metrics = TargetMetrics::default();
        for host_id in self.target_closure(host_ids, label_ids).await? {
            let host = match self.store.host(host_id).await {
                Ok(host) => host,
                // Deleted since selection.
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(ServiceError::from(e)),
            };
            metrics.total += 1;
            match host.status(now) {
                HostStatus::Online => metrics.online += 1,
                HostStatus::Offline => metrics.offline += 1,
                HostStatus::Mia => metrics.missing_in_action += 1,
            }
        }
        Ok(metrics)
    }

    pub async fn campaign_metrics(&self, campaign_id: CampaignId) -> ServiceResult<TargetMetrics> {
        let (hosts, labels) =
            self.store.campaign_target_ids(campaign_id).await.context("load campaign targets")?;
        self.count_hosts_in_targets(&hosts, &labels).await
    }

    pub async fn campaign(&self, campaign_id: CampaignId) -> ServiceResult<DistributedQueryCampaign> {
        self.store.campaign(campaign_id).await.context("load campaign")
    }

    /// Mark a running campaign complete; live sessions watching it end.
    pub async fn complete_campaign(
        &self,
        viewer: &Viewer,
        campaign_id: CampaignId,
    ) -> ServiceResult<DistributedQueryCampaign> {
        let campaign = self.campaign(campaign_id).await?;
        if !viewer.owns_or_admin(campaign.user_id) {
            return Err(ServiceError::Forbidden("campaign belongs to another user".to_string()));
        }
        let campaign = self.finish(campaign, CampaignStatus::Complete).await?;
        info!(%campaign_id, user_id = %viewer.user_id(), "campaign completed");
        Ok(campaign)
    }

    /// Move a running campaign to `error`.
    pub async fn fail_campaign(&self, campaign_id: CampaignId, reason: &str) -> ServiceResult<DistributedQueryCampaign> {
        let campaign = self.campaign(campaign_id).await?;
        let campaign = self.finish(campaign, CampaignStatus::Error).await?;
        warn!(%campaign_id, reason, "campaign failed");
        Ok(campaign)
    }

    async fn finish(
        &self,
        mut campaign: DistributedQueryCampaign,
        status: CampaignStatus,
    ) -> ServiceResult<DistributedQueryCampaign> {
        if campaign.status.is_terminal() {
            return Err(ServiceError::Conflict(format!("campaign {} is {}", campaign.id, campaign.status)));
        }
        campaign.status = status;
        self.store.save_campaign(&campaign).await.context("save campaign")?;
        Ok(campaign)
    }
}

#[cfg(test)]
#[path = "campaigns_tests.rs"]
mod tests;
