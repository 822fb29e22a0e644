// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queries, packs, and decorators.

use fleet_core::{
    Decorator, DecoratorId, HostId, LabelId, Pack, PackId, Query, QueryId, ScheduledQuery,
    ScheduledQueryOptions,
};
use std::collections::BTreeSet;

use super::MemState;
use crate::{StoreError, StoreResult};

impl MemState {
    pub(super) fn new_query(&mut self, mut query: Query) -> StoreResult<Query> {
        if query.saved && self.queries.values().any(|q| q.saved && q.name == query.name) {
            return Err(StoreError::already_exists(QueryId::KIND, &query.name));
        }
        query.id = QueryId::new(self.next_id(QueryId::KIND));
        self.queries.insert(query.id, query.clone());
        Ok(query)
    }

    pub(super) fn query(&self, id: QueryId) -> StoreResult<Query> {
        self.queries.get(&id).cloned().ok_or_else(|| StoreError::not_found(QueryId::KIND, id))
    }

    pub(super) fn new_pack(&mut self, mut pack: Pack) -> StoreResult<Pack> {
        if self.packs.values().any(|p| p.name == pack.name) {
            return Err(StoreError::already_exists(PackId::KIND, &pack.name));
        }
        pack.id = PackId::new(self.next_id(PackId::KIND));
        self.packs.insert(pack.id, pack.clone());
        Ok(pack)
    }

    pub(super) fn add_label_to_pack(&mut self, pack_id: PackId, label_id: LabelId) -> StoreResult<()> {
        self.require_pack(pack_id)?;
        if !self.labels.contains_key(&label_id) {
            return Err(StoreError::not_found(LabelId::KIND, label_id));
        }
        self.pack_targets.insert((pack_id, label_id));
        Ok(())
    }

    pub(super) fn add_query_to_pack(
        &mut self,
        pack_id: PackId,
        query_id: QueryId,
        options: ScheduledQueryOptions,
    ) -> StoreResult<()> {
        self.require_pack(pack_id)?;
        if !self.queries.contains_key(&query_id) {
            return Err(StoreError::not_found(QueryId::KIND, query_id));
        }
        self.pack_queries.insert((pack_id, query_id), options);
        Ok(())
    }

    pub(super) fn list_packs_for_host(&self, host_id: HostId) -> Vec<Pack> {
        let labels = self.matching_label_ids(host_id);
        let pack_ids: BTreeSet<PackId> = self
            .pack_targets
            .iter()
            .filter(|(_, label_id)| labels.contains(label_id))
            .map(|(pack_id, _)| *pack_id)
            .collect();
        pack_ids
            .into_iter()
            .filter_map(|id| self.packs.get(&id))
            .filter(|pack| !pack.disabled)
            .cloned()
            .collect()
    }

    pub(super) fn scheduled_queries_in_pack(&self, pack_id: PackId) -> StoreResult<Vec<ScheduledQuery>> {
        self.require_pack(pack_id)?;
        Ok(self
            .pack_queries
            .range((pack_id, QueryId::new(0))..=(pack_id, QueryId::new(u64::MAX)))
            .filter_map(|(&(pack_id, query_id), options)| {
                let query = self.queries.get(&query_id)?;
                Some(ScheduledQuery {
                    pack_id,
                    query_id,
                    name: query.name.clone(),
                    query: query.query.clone(),
                    options: options.clone(),
                })
            })
            .collect())
    }

    pub(super) fn new_decorator(&mut self, mut decorator: Decorator) -> Decorator {
        decorator.id = DecoratorId::new(self.next_id(DecoratorId::KIND));
        self.decorators.insert(decorator.id, decorator.clone());
        decorator
    }

    fn require_pack(&self, pack_id: PackId) -> StoreResult<()> {
        if self.packs.contains_key(&pack_id) {
            Ok(())
        } else {
            Err(StoreError::not_found(PackId::KIND, pack_id))
        }
    }
}
