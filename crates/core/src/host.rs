// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enrolled host record and the online/offline/MIA status classifier.

use crate::id::HostId;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hosts not seen for longer than this are missing in action.
pub const MIA_CUTOFF: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Online window used until the agent has reported any check-in interval.
pub const DEFAULT_ONLINE_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Grace added on top of the largest reported check-in interval.
pub const ONLINE_INTERVAL_SLACK: Duration = Duration::from_secs(60);

/// Connectivity state derived from `seen_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Online,
    Offline,
    Mia,
}

crate::simple_display! {
    HostStatus {
        Online => "online",
        Offline => "offline",
        Mia => "mia",
    }
}

/// Detail update time given to freshly enrolled hosts.
///
/// Far enough in the past that the next distributed read returns the whole
/// detail family.
pub fn detail_update_sentinel() -> DateTime<Utc> {
    Utc.timestamp_opt(24 * 60 * 60, 0).single().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub id: HostId,
    /// Identifier the agent presents at enrollment. Unique.
    pub osquery_host_id: String,
    /// Current credential. Rotated on every enrollment.
    pub node_key: String,
    pub host_name: String,
    pub uuid: String,
    pub platform: String,
    pub os_version: String,
    pub osquery_version: String,
    pub os_build: String,
    pub uptime: Duration,
    pub physical_memory: u64,
    pub cpu_type: String,
    pub cpu_subtype: String,
    pub cpu_brand: String,
    pub cpu_physical_cores: u32,
    pub cpu_logical_cores: u32,
    pub hardware_vendor: String,
    pub hardware_model: String,
    pub hardware_version: String,
    pub hardware_serial: String,
    pub computer_name: String,
    pub primary_ip: String,
    pub primary_mac: String,
    pub detail_update_time: DateTime<Utc>,
    pub seen_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Agent-reported intervals in seconds. Zero means not yet reported.
    pub config_tls_refresh: u32,
    pub distributed_interval: u32,
    pub logger_tls_period: u32,
}

impl Host {
    /// A blank host as created by enrollment at time `now`.
    pub fn enrolled(osquery_host_id: impl Into<String>, node_key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: HostId::default(),
            osquery_host_id: osquery_host_id.into(),
            node_key: node_key.into(),
            host_name: String::new(),
            uuid: String::new(),
            platform: String::new(),
            os_version: String::new(),
            osquery_version: String::new(),
            os_build: String::new(),
            uptime: Duration::ZERO,
            physical_memory: 0,
            cpu_type: String::new(),
            cpu_subtype: String::new(),
            cpu_brand: String::new(),
            cpu_physical_cores: 0,
            cpu_logical_cores: 0,
            hardware_vendor: String::new(),
            hardware_model: String::new(),
            hardware_version: String::new(),
            hardware_serial: String::new(),
            computer_name: String::new(),
            primary_ip: String::new(),
            primary_mac: String::new(),
            detail_update_time: detail_update_sentinel(),
            seen_time: now,
            created_at: now,
            config_tls_refresh: 0,
            distributed_interval: 0,
            logger_tls_period: 0,
        }
    }

    /// Copy the fields an agent reports about itself from `reported`.
    ///
    /// Identity (`id`, `osquery_host_id`, `node_key`, `created_at`) is kept.
    pub fn merge_reported(&mut self, reported: &Host) {
        self.host_name.clone_from(&reported.host_name);
        self.uuid.clone_from(&reported.uuid);
        self.platform.clone_from(&reported.platform);
        self.os_version.clone_from(&reported.os_version);
        self.osquery_version.clone_from(&reported.osquery_version);
        self.os_build.clone_from(&reported.os_build);
        self.uptime = reported.uptime;
        self.physical_memory = reported.physical_memory;
        self.cpu_type.clone_from(&reported.cpu_type);
        self.cpu_subtype.clone_from(&reported.cpu_subtype);
        self.cpu_brand.clone_from(&reported.cpu_brand);
        self.cpu_physical_cores = reported.cpu_physical_cores;
        self.cpu_logical_cores = reported.cpu_logical_cores;
        self.hardware_vendor.clone_from(&reported.hardware_vendor);
        self.hardware_model.clone_from(&reported.hardware_model);
        self.hardware_version.clone_from(&reported.hardware_version);
        self.hardware_serial.clone_from(&reported.hardware_serial);
        self.computer_name.clone_from(&reported.computer_name);
        self.primary_ip.clone_from(&reported.primary_ip);
        self.primary_mac.clone_from(&reported.primary_mac);
        self.detail_update_time = reported.detail_update_time;
        self.seen_time = reported.seen_time;
        self.config_tls_refresh = reported.config_tls_refresh;
        self.distributed_interval = reported.distributed_interval;
        self.logger_tls_period = reported.logger_tls_period;
    }

    /// Longest gap between check-ins before the host stops counting as online.
    pub fn online_interval(&self) -> Duration {
        let reported = self
            .distributed_interval
            .max(self.config_tls_refresh)
            .max(self.logger_tls_period);
        if reported == 0 {
            return DEFAULT_ONLINE_INTERVAL;
        }
        Duration::from_secs(u64::from(reported)) + ONLINE_INTERVAL_SLACK
    }

    /// Classify the host at wall time `now`.
    ///
    /// A `seen_time` in the future (clock skew) counts as online.
    pub fn status(&self, now: DateTime<Utc>) -> HostStatus {
        let elapsed = match (now - self.seen_time).to_std() {
            Ok(elapsed) => elapsed,
            Err(_) => return HostStatus::Online,
        };
        if elapsed <= self.online_interval() {
            HostStatus::Online
        } else if elapsed <= MIA_CUTOFF {
            HostStatus::Offline
        } else {
            HostStatus::Mia
        }
    }

    /// Whether the host belongs to a label restricted to `platform`.
    ///
    /// The filter is a comma-separated list; an empty filter matches every host.
    pub fn matches_platform(&self, platform: &str) -> bool {
        let filter = platform.trim();
        if filter.is_empty() {
            return true;
        }
        filter
            .split(',')
            .map(str::trim)
            .any(|p| !p.is_empty() && p.eq_ignore_ascii_case(&self.platform))
    }
}

/// Fleet-wide status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSummary {
    pub online_count: u64,
    pub offline_count: u64,
    pub mia_count: u64,
}

impl HostSummary {
    pub fn record(&mut self, status: HostStatus) {
        match status {
            HostStatus::Online => self.online_count += 1,
            HostStatus::Offline => self.offline_count += 1,
            HostStatus::Mia => self.mia_count += 1,
        }
    }
}

crate::builder! {
    pub struct HostBuilder => Host {
        into {
            osquery_host_id: String = "host-1",
            node_key: String = "node-key-1",
            host_name: String = "host-1.local",
            uuid: String = "",
            platform: String = "darwin",
            os_version: String = "",
            osquery_version: String = "",
            os_build: String = "",
            cpu_type: String = "",
            cpu_subtype: String = "",
            cpu_brand: String = "",
            hardware_vendor: String = "",
            hardware_model: String = "",
            hardware_version: String = "",
            hardware_serial: String = "",
            computer_name: String = "",
            primary_ip: String = "",
            primary_mac: String = "",
        }
        set {
            id: HostId = HostId::default(),
            uptime: Duration = Duration::ZERO,
            physical_memory: u64 = 0,
            cpu_physical_cores: u32 = 0,
            cpu_logical_cores: u32 = 0,
            detail_update_time: DateTime<Utc> = detail_update_sentinel(),
            seen_time: DateTime<Utc> = DateTime::<Utc>::default(),
            created_at: DateTime<Utc> = DateTime::<Utc>::default(),
            config_tls_refresh: u32 = 0,
            distributed_interval: u32 = 0,
            logger_tls_period: u32 = 0,
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
