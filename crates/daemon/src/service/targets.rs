// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target picker search for live queries.

use std::collections::BTreeSet;

use fleet_core::{Host, Label};
use fleet_wire::{HostTarget, SearchTargetsRequest, SearchTargetsResponse, TargetMatches};

use super::{Service, ServiceResult, StoreContext};

/// Most hosts and most labels returned per search.
pub const SEARCH_LIMIT: usize = 10;

/// Label offered for every search regardless of the query text.
const ALL_HOSTS: &str = "All Hosts";

fn host_matches(host: &Host, query: &str) -> bool {
    host.host_name.contains(query) || (!host.primary_ip.is_empty() && host.primary_ip.contains(query))
}

impl Service {
    /// Hosts and labels matching `query` that are not already selected,
    /// with host counts over the current selection.
    pub async fn search_targets(&self, request: &SearchTargetsRequest) -> ServiceResult<SearchTargetsResponse> {
        let now = self.clock.now();
        let query = request.query.trim();
        let omit_hosts: BTreeSet<_> = request.selected.hosts.iter().copied().collect();
        let omit_labels: BTreeSet<_> = request.selected.labels.iter().copied().collect();

        let mut hosts = self.store.list_hosts().await.context("list hosts")?;
        hosts.sort_by_key(|h| h.id);
        let hosts = hosts
            .into_iter()
            .filter(|h| !omit_hosts.contains(&h.id) && host_matches(h, query))
            .take(SEARCH_LIMIT)
            .map(|h| HostTarget {
                id: h.id,
                status: h.status(now),
                host_name: h.host_name,
                platform: h.platform,
                primary_ip: h.primary_ip,
            })
            .collect();

        let mut labels: Vec<Label> = self.store.list_labels().await.context("list labels")?;
        labels.sort_by_key(|l| l.id);
        let labels = labels
            .into_iter()
            .filter(|l| !omit_labels.contains(&l.id) && (l.name.contains(query) || l.name == ALL_HOSTS))
            .take(SEARCH_LIMIT)
            .collect();

        let metrics = self
            .count_hosts_in_targets(&request.selected.hosts, &request.selected.labels)
            .await?;
        Ok(SearchTargetsResponse {
            targets: TargetMatches { hosts, labels },
            targets_count: metrics.total,
            targets_online: metrics.online,
            targets_offline: metrics.offline,
            targets_missing_in_action: metrics.missing_in_action,
        })
    }
}

#[cfg(test)]
#[path = "targets_tests.rs"]
mod tests;
