// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent control loop: config, distributed read/write, and log ingestion.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use fleet_core::{
    CampaignId, DecoratorType, DistributedQueryResult, ExecutionStatus, Host, HostIdentity, LabelId,
    Row,
};
use fleet_storage::StoreError;
use fleet_wire::{
    Decorators, DistributedReadResponse, LogType, OsqueryConfig, PackContent, QueryContent, QueryKey,
};
use tracing::{debug, warn};

use super::details::{self, DETAIL_QUERIES};
use super::{Service, ServiceError, ServiceResult, StoreContext};
use crate::bus::{BusError, BusMessage};

/// Bounds on the `accelerate` hint, in seconds.
///
/// Every host whose details are already due gets the minimum.
pub const MIN_ACCELERATE: Duration = Duration::from_secs(10);
pub const MAX_ACCELERATE: Duration = Duration::from_secs(300);

/// Whether the host's details are stale at `now` (closed bound).
pub fn details_due(host: &Host, now: DateTime<Utc>, interval: Duration) -> bool {
    match (now - host.detail_update_time).to_std() {
        Ok(elapsed) => elapsed >= interval,
        Err(_) => false,
    }
}

/// Seconds the agent should poll faster while details are outstanding.
///
/// The hint is the time left until details fall due, clamped to
/// `MIN_ACCELERATE..=MAX_ACCELERATE`. A host already due gets the minimum.
pub fn accelerate_seconds(host: &Host, now: DateTime<Utc>, interval: Duration) -> u64 {
    let elapsed = (now - host.detail_update_time).to_std().unwrap_or(Duration::ZERO);
    let remaining = interval.saturating_sub(elapsed);
    remaining.clamp(MIN_ACCELERATE, MAX_ACCELERATE).as_secs()
}

impl Service {
    /// Agent configuration: global options, decorators, and the packs
    /// targeting any label the host belongs to.
    pub async fn get_client_config(&self, host: &Host) -> ServiceResult<OsqueryConfig> {
        let options = self.store.osquery_options().await.context("load osquery options")?;

        let mut decorators = Decorators::default();
        for decorator in self.store.list_decorators().await.context("list decorators")? {
            match decorator.decorator_type {
                DecoratorType::Load => decorators.load.push(decorator.query),
                DecoratorType::Always => decorators.always.push(decorator.query),
                DecoratorType::Interval => decorators
                    .interval
                    .entry(decorator.interval.to_string())
                    .or_default()
                    .push(decorator.query),
            }
        }

        let mut packs = BTreeMap::new();
        for pack in self.store.list_packs_for_host(host.id).await.context("list packs for host")? {
            let scheduled =
                self.store.scheduled_queries_in_pack(pack.id).await.context("list pack queries")?;
            let queries = scheduled
                .into_iter()
                .map(|sq| {
                    let content = QueryContent {
                        query: sq.query,
                        interval: sq.options.interval,
                        platform: sq.options.platform,
                        version: sq.options.version,
                        snapshot: sq.options.snapshot,
                        removed: sq.options.removed,
                        shard: sq.options.shard,
                    };
                    (sq.name, content)
                })
                .collect();
            let platform = (!pack.platform.is_empty()).then_some(pack.platform);
            packs.insert(pack.name, PackContent { platform, queries });
        }

        Ok(OsqueryConfig { options, decorators, packs })
    }

    /// Queries the host should run now: stale details, stale labels, and
    /// campaigns still waiting on this host.
    ///
    /// Campaign executions handed out here move `waiting -> requested`.
    pub async fn get_distributed_queries(&self, host: &Host) -> ServiceResult<DistributedReadResponse> {
        let now = self.clock.now();
        let osquery = &self.config.osquery;
        let mut response = DistributedReadResponse::default();

        if details_due(host, now, osquery.detail_update_interval()) {
            for query in DETAIL_QUERIES {
                response.queries.insert(QueryKey::detail(query.name), query.sql.to_string());
            }
            response.accelerate = Some(accelerate_seconds(host, now, osquery.detail_update_interval()));
        }

        let cutoff = now - chrono::Duration::from_std(osquery.label_update_interval())
            .unwrap_or_else(|_| chrono::Duration::zero());
        let labels = self.store.label_queries_for_host(host, cutoff).await.context("label queries")?;
        for (label_id, sql) in labels {
            response.queries.insert(QueryKey::label(label_id), sql);
        }

        let campaigns =
            self.store.distributed_queries_for_host(host).await.context("campaign queries")?;
        for (campaign_id, sql) in campaigns {
            match self
                .store
                .update_execution(host.id, campaign_id, ExecutionStatus::Requested, None)
                .await
            {
                Ok(_) => {
                    response.queries.insert(QueryKey::campaign(campaign_id), sql);
                }
                Err(StoreError::Conflict(reason)) => {
                    debug!(host_id = %host.id, %campaign_id, %reason, "execution already requested");
                }
                Err(e) => return Err(ServiceError::from(e)),
            }
        }

        Ok(response)
    }

    /// Fold distributed query results back into host state, label
    /// membership, and campaign result channels.
    pub async fn submit_distributed_query_results(
        &self,
        host: &Host,
        results: &BTreeMap<String, Vec<Row>>,
        statuses: &BTreeMap<String, String>,
    ) -> ServiceResult<()> {
        let now = self.clock.now();
        let mut host = host.clone();
        let mut details_updated = false;
        let mut label_results: BTreeMap<LabelId, bool> = BTreeMap::new();
        let mut campaign_results = Vec::new();

        for (name, rows) in results {
            match QueryKey::parse(name) {
                QueryKey::Detail(detail) => match details::ingest(detail, &mut host, rows) {
                    Ok(()) => details_updated = true,
                    Err(e) => warn!(host_id = %host.id, error = %e, "dropping detail result"),
                },
                QueryKey::Label(label_id) => {
                    label_results.insert(label_id, !rows.is_empty());
                }
                QueryKey::Campaign(campaign_id) => {
                    campaign_results.push((campaign_id, rows.as_slice(), statuses.get(name)));
                }
                QueryKey::Unknown(name) => {
                    warn!(host_id = %host.id, query = name, "unrecognized distributed query result");
                }
            }
        }

        // Failed campaign queries may report a status without rows.
        for (name, status) in statuses {
            if let (QueryKey::Campaign(campaign_id), false) =
                (QueryKey::parse(name), results.contains_key(name))
            {
                campaign_results.push((campaign_id, &[], Some(status)));
            }
        }

        if details_updated {
            host.detail_update_time = now;
        }
        if !label_results.is_empty() {
            self.store
                .record_label_query_executions(&host, &label_results, now)
                .await
                .context("record label results")?;
        }
        for (campaign_id, rows, status) in campaign_results {
            self.ingest_campaign_result(&host, campaign_id, rows, status.map(String::as_str)).await?;
        }

        host.seen_time = now;
        self.store.update_host_details(&host).await.context("save host details")?;
        Ok(())
    }

    async fn ingest_campaign_result(
        &self,
        host: &Host,
        campaign_id: CampaignId,
        rows: &[Row],
        status: Option<&str>,
    ) -> ServiceResult<()> {
        let error = match status {
            None | Some("0") => None,
            Some(status) => Some(format!("agent reported status {status}")),
        };

        let result = DistributedQueryResult {
            distributed_query_campaign_id: campaign_id,
            host: HostIdentity { id: host.id, hostname: host.host_name.clone() },
            rows: rows.to_vec(),
            error: error.clone(),
        };
        match self.bus.publish(campaign_id, BusMessage::Result(result)).await {
            Ok(()) => {}
            Err(BusError::NoSubscriber(_)) => {
                debug!(%campaign_id, host_id = %host.id, "no operator watching campaign");
            }
            Err(e) => warn!(%campaign_id, host_id = %host.id, error = %e, "failed to publish result"),
        }

        let next = if error.is_some() { ExecutionStatus::Failed } else { ExecutionStatus::Succeeded };
        self.finish_execution(host, campaign_id, next, error).await
    }

    async fn finish_execution(
        &self,
        host: &Host,
        campaign_id: CampaignId,
        next: ExecutionStatus,
        error: Option<String>,
    ) -> ServiceResult<()> {
        let current = match self.store.distributed_query_execution(host.id, campaign_id).await {
            Ok(execution) => execution.status,
            Err(e) if e.is_not_found() => {
                warn!(%campaign_id, host_id = %host.id, "result for campaign not targeting host");
                return Ok(());
            }
            Err(e) => return Err(ServiceError::from(e)),
        };

        if current == ExecutionStatus::Waiting {
            self.store
                .update_execution(host.id, campaign_id, ExecutionStatus::Requested, None)
                .await
                .context("request execution")?;
        }
        match self.store.update_execution(host.id, campaign_id, next, error).await {
            Ok(_) => Ok(()),
            Err(StoreError::Conflict(reason)) => {
                warn!(%campaign_id, host_id = %host.id, %reason, "ignoring conflicting execution result");
                Ok(())
            }
            Err(e) => Err(ServiceError::from(e)),
        }
    }

    /// Append each log record as one JSON line to the matching sink.
    ///
    /// Records that are not JSON objects are dropped; the rest proceed.
    pub fn submit_logs(&self, host: &Host, log_type: LogType, records: &[serde_json::Value]) -> ServiceResult<()> {
        let sink = match log_type {
            LogType::Status => &self.status_log,
            LogType::Result => &self.result_log,
        };
        for record in records {
            if !record.is_object() {
                warn!(host_id = %host.id, %log_type, "dropping malformed log record");
                continue;
            }
            let line = serde_json::to_vec(record).map_err(|e| ServiceError::Internal(e.to_string()))?;
            sink.write_line(&line).map_err(|e| ServiceError::Unavailable(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
