// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Labels: named queries evaluated by the agent to group hosts.

use crate::id::{HostId, LabelId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    /// Shipped with the server; cannot be deleted.
    Builtin,
    #[default]
    Regular,
}

crate::simple_display! {
    LabelType {
        Builtin => "builtin",
        Regular => "regular",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub query: String,
    /// Empty matches every platform.
    #[serde(default)]
    pub platform: String,
    pub label_type: LabelType,
}

impl Label {
    pub fn is_builtin(&self) -> bool {
        self.label_type == LabelType::Builtin
    }
}

/// Result of the most recent evaluation of a label on a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMembership {
    pub host_id: HostId,
    pub label_id: LabelId,
    pub matches: bool,
    pub updated_at: DateTime<Utc>,
}

crate::builder! {
    pub struct LabelBuilder => Label {
        into {
            name: String = "All Hosts",
            description: String = "",
            query: String = "select 1;",
            platform: String = "",
        }
        set {
            id: LabelId = LabelId::default(),
            label_type: LabelType = LabelType::Regular,
        }
    }
}
