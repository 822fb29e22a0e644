// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host table operations.

use chrono::{DateTime, Utc};
use fleet_core::{Host, HostId, HostSummary};

use super::MemState;
use crate::{StoreError, StoreResult};

impl MemState {
    pub(super) fn enroll_host(
        &mut self,
        osquery_host_id: &str,
        node_key: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Host> {
        if osquery_host_id.is_empty() {
            return Err(StoreError::Invalid("missing osquery host identifier".to_string()));
        }
        let existing = self.host_id_by_osquery_id(osquery_host_id);
        if self.node_key_taken(node_key, existing) {
            return Err(StoreError::already_exists("node key for host", osquery_host_id));
        }

        let id = match existing {
            Some(id) => id,
            None => {
                let id = HostId::new(self.next_id(HostId::KIND));
                let mut host = Host::enrolled(osquery_host_id, node_key, now);
                host.id = id;
                self.hosts.insert(id, host);
                id
            }
        };
        let host = self.hosts.get_mut(&id).ok_or_else(|| StoreError::not_found(HostId::KIND, id))?;
        host.node_key = node_key.to_string();
        Ok(host.clone())
    }

    pub(super) fn authenticate_host(&self, node_key: &str) -> StoreResult<Host> {
        if node_key.is_empty() {
            return Err(StoreError::not_found("node key", "<empty>"));
        }
        self.hosts
            .values()
            .find(|h| h.node_key == node_key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("node key", "<redacted>"))
    }

    pub(super) fn new_host(&mut self, mut host: Host) -> StoreResult<Host> {
        if self.host_id_by_osquery_id(&host.osquery_host_id).is_some() {
            return Err(StoreError::already_exists(HostId::KIND, &host.osquery_host_id));
        }
        if self.node_key_taken(&host.node_key, None) {
            return Err(StoreError::already_exists("node key for host", &host.osquery_host_id));
        }
        host.id = HostId::new(self.next_id(HostId::KIND));
        self.hosts.insert(host.id, host.clone());
        Ok(host)
    }

    pub(super) fn save_host(&mut self, host: &Host) -> StoreResult<()> {
        if !self.hosts.contains_key(&host.id) {
            return Err(StoreError::not_found(HostId::KIND, host.id));
        }
        if self.node_key_taken(&host.node_key, Some(host.id)) {
            return Err(StoreError::already_exists("node key for host", host.id));
        }
        if let Some(other) = self.host_id_by_osquery_id(&host.osquery_host_id) {
            if other != host.id {
                return Err(StoreError::already_exists(HostId::KIND, &host.osquery_host_id));
            }
        }
        self.hosts.insert(host.id, host.clone());
        Ok(())
    }

    pub(super) fn host(&self, id: HostId) -> StoreResult<Host> {
        self.hosts.get(&id).cloned().ok_or_else(|| StoreError::not_found(HostId::KIND, id))
    }

    pub(super) fn delete_host(&mut self, id: HostId) -> StoreResult<()> {
        if self.hosts.remove(&id).is_none() {
            return Err(StoreError::not_found(HostId::KIND, id));
        }
        self.memberships.retain(|(host_id, _), _| *host_id != id);
        self.executions.retain(|(host_id, _), _| *host_id != id);
        Ok(())
    }

    pub(super) fn update_host_details(&mut self, reported: &Host) -> StoreResult<()> {
        let host = self
            .hosts
            .get_mut(&reported.id)
            .ok_or_else(|| StoreError::not_found(HostId::KIND, reported.id))?;
        host.merge_reported(reported);
        Ok(())
    }

    pub(super) fn mark_host_seen(&mut self, id: HostId, seen: DateTime<Utc>) -> StoreResult<()> {
        let host = self.hosts.get_mut(&id).ok_or_else(|| StoreError::not_found(HostId::KIND, id))?;
        host.seen_time = seen;
        Ok(())
    }

    pub(super) fn host_status_summary(&self, now: DateTime<Utc>) -> HostSummary {
        let mut summary = HostSummary::default();
        for host in self.hosts.values() {
            summary.record(host.status(now));
        }
        summary
    }

    fn host_id_by_osquery_id(&self, osquery_host_id: &str) -> Option<HostId> {
        self.hosts.values().find(|h| h.osquery_host_id == osquery_host_id).map(|h| h.id)
    }

    /// Whether a host other than `owner` already holds `node_key`.
    fn node_key_taken(&self, node_key: &str, owner: Option<HostId>) -> bool {
        !node_key.is_empty()
            && self.hosts.values().any(|h| h.node_key == node_key && Some(h.id) != owner)
    }
}
