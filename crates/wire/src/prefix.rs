// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query name prefixes used to demultiplex distributed results.
//!
//! Agents echo back the names the server handed out on distributed read, so
//! these strings must never change.

use fleet_core::{CampaignId, LabelId};

pub const DETAIL_QUERY_PREFIX: &str = "kolide_detail_query_";
pub const LABEL_QUERY_PREFIX: &str = "kolide_label_query_";
pub const CAMPAIGN_QUERY_PREFIX: &str = "kolide_distributed_query_";

/// A distributed query name, classified by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKey<'a> {
    Detail(&'a str),
    Label(LabelId),
    Campaign(CampaignId),
    /// Known prefix with an unparsable id, or no known prefix at all.
    Unknown(&'a str),
}

impl<'a> QueryKey<'a> {
    pub fn parse(name: &'a str) -> Self {
        if let Some(detail) = name.strip_prefix(DETAIL_QUERY_PREFIX) {
            return QueryKey::Detail(detail);
        }
        if let Some(id) = name.strip_prefix(LABEL_QUERY_PREFIX) {
            return id.parse().map(QueryKey::Label).unwrap_or(QueryKey::Unknown(name));
        }
        if let Some(id) = name.strip_prefix(CAMPAIGN_QUERY_PREFIX) {
            return id.parse().map(QueryKey::Campaign).unwrap_or(QueryKey::Unknown(name));
        }
        QueryKey::Unknown(name)
    }

    pub fn detail(name: &str) -> String {
        format!("{DETAIL_QUERY_PREFIX}{name}")
    }

    pub fn label(id: LabelId) -> String {
        format!("{LABEL_QUERY_PREFIX}{id}")
    }

    pub fn campaign(id: CampaignId) -> String {
        format!("{CAMPAIGN_QUERY_PREFIX}{id}")
    }
}

#[cfg(test)]
#[path = "prefix_tests.rs"]
mod tests;
