// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Label and label membership operations.

use chrono::{DateTime, Utc};
use fleet_core::{Host, HostId, Label, LabelId, LabelMembership};
use std::collections::{BTreeMap, BTreeSet};

use super::MemState;
use crate::{StoreError, StoreResult};

impl MemState {
    pub(super) fn new_label(&mut self, mut label: Label) -> StoreResult<Label> {
        if self.labels.values().any(|l| l.name == label.name) {
            return Err(StoreError::already_exists(LabelId::KIND, &label.name));
        }
        label.id = LabelId::new(self.next_id(LabelId::KIND));
        self.labels.insert(label.id, label.clone());
        Ok(label)
    }

    pub(super) fn label(&self, id: LabelId) -> StoreResult<Label> {
        self.labels.get(&id).cloned().ok_or_else(|| StoreError::not_found(LabelId::KIND, id))
    }

    pub(super) fn delete_label(&mut self, id: LabelId) -> StoreResult<()> {
        let label = self.labels.get(&id).ok_or_else(|| StoreError::not_found(LabelId::KIND, id))?;
        if label.is_builtin() {
            return Err(StoreError::Invalid(format!("cannot delete builtin label {:?}", label.name)));
        }
        self.labels.remove(&id);
        self.memberships.retain(|(_, label_id), _| *label_id != id);
        self.pack_targets.retain(|(_, label_id)| *label_id != id);
        Ok(())
    }

    pub(super) fn label_queries_for_host(
        &self,
        host: &Host,
        cutoff: DateTime<Utc>,
    ) -> BTreeMap<LabelId, String> {
        self.labels
            .values()
            .filter(|label| host.matches_platform(&label.platform))
            .filter(|label| {
                self.memberships
                    .get(&(host.id, label.id))
                    .map_or(true, |m| m.updated_at < cutoff)
            })
            .map(|label| (label.id, label.query.clone()))
            .collect()
    }

    pub(super) fn record_label_query_executions(
        &mut self,
        host: &Host,
        results: &BTreeMap<LabelId, bool>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        if !self.hosts.contains_key(&host.id) {
            return Err(StoreError::not_found(HostId::KIND, host.id));
        }
        for (&label_id, &matches) in results {
            if !self.labels.contains_key(&label_id) {
                tracing::debug!(host_id = %host.id, %label_id, "skipping result for unknown label");
                continue;
            }
            self.memberships.insert(
                (host.id, label_id),
                LabelMembership { host_id: host.id, label_id, matches, updated_at },
            );
        }
        Ok(())
    }

    pub(super) fn list_labels_for_host(&self, host_id: HostId) -> Vec<Label> {
        self.matching_label_ids(host_id)
            .into_iter()
            .filter_map(|id| self.labels.get(&id).cloned())
            .collect()
    }

    pub(super) fn list_unique_hosts_in_labels(&self, label_ids: &[LabelId]) -> Vec<Host> {
        let wanted: BTreeSet<LabelId> = label_ids.iter().copied().collect();
        let host_ids: BTreeSet<HostId> = self
            .memberships
            .values()
            .filter(|m| m.matches && wanted.contains(&m.label_id))
            .map(|m| m.host_id)
            .collect();
        host_ids.into_iter().filter_map(|id| self.hosts.get(&id).cloned()).collect()
    }

    pub(super) fn matching_label_ids(&self, host_id: HostId) -> BTreeSet<LabelId> {
        self.memberships
            .values()
            .filter(|m| m.host_id == host_id && m.matches)
            .map(|m| m.label_id)
            .collect()
    }
}
