// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: TOML file plus `FLEET_<SECTION>_<KEY>` overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::env;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerSettings,
    pub osquery: OsquerySettings,
    pub session: SessionSettings,
    pub live_query: LiveQuerySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { address: "0.0.0.0:8080".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OsquerySettings {
    /// Random bytes per generated node key.
    pub node_key_size: usize,
    pub enroll_secret: String,
    pub status_log_file: PathBuf,
    pub result_log_file: PathBuf,
    /// Seconds between detail query refreshes per host.
    pub detail_update_interval: u64,
    /// Seconds between label query refreshes per host.
    pub label_update_interval: u64,
    /// Seconds between periodic log sink flushes.
    pub log_flush_interval: u64,
}

impl Default for OsquerySettings {
    fn default() -> Self {
        Self {
            node_key_size: 24,
            enroll_secret: String::new(),
            status_log_file: PathBuf::from("/tmp/osquery_status"),
            result_log_file: PathBuf::from("/tmp/osquery_result"),
            detail_update_interval: 3600,
            label_update_interval: 3600,
            log_flush_interval: 10,
        }
    }
}

impl OsquerySettings {
    pub fn detail_update_interval(&self) -> Duration {
        Duration::from_secs(self.detail_update_interval)
    }

    pub fn label_update_interval(&self) -> Duration {
        Duration::from_secs(self.label_update_interval)
    }

    pub fn log_flush_interval(&self) -> Duration {
        Duration::from_secs(self.log_flush_interval)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSettings {
    pub expiration_seconds: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { expiration_seconds: 90 * 24 * 60 * 60 }
    }
}

impl SessionSettings {
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiveQuerySettings {
    pub io_timeout_ms: u64,
    pub tick_ms: u64,
}

impl Default for LiveQuerySettings {
    fn default() -> Self {
        Self { io_timeout_ms: 3000, tick_ms: 1000 }
    }
}

impl LiveQuerySettings {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Daily-rolled log file. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load the file at `path` (defaults when `None`), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(env::var)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `FLEET_<SECTION>_<KEY>` overrides resolved through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |section: &str, key: &str| {
            let name = env::override_name(section, key);
            let value = lookup(&name);
            (name, value)
        };

        set(var("server", "address"), &mut self.server.address)?;

        let osquery = &mut self.osquery;
        set(var("osquery", "node_key_size"), &mut osquery.node_key_size)?;
        set(var("osquery", "enroll_secret"), &mut osquery.enroll_secret)?;
        set(var("osquery", "status_log_file"), &mut osquery.status_log_file)?;
        set(var("osquery", "result_log_file"), &mut osquery.result_log_file)?;
        set(var("osquery", "detail_update_interval"), &mut osquery.detail_update_interval)?;
        set(var("osquery", "label_update_interval"), &mut osquery.label_update_interval)?;
        set(var("osquery", "log_flush_interval"), &mut osquery.log_flush_interval)?;

        set(var("session", "expiration_seconds"), &mut self.session.expiration_seconds)?;

        set(var("live_query", "io_timeout_ms"), &mut self.live_query.io_timeout_ms)?;
        set(var("live_query", "tick_ms"), &mut self.live_query.tick_ms)?;

        if let (_, Some(file)) = var("logging", "file") {
            self.logging.file = Some(PathBuf::from(file));
        }
        Ok(())
    }
}

fn set<T: FromStr>((key, value): (String, Option<String>), slot: &mut T) -> Result<(), ConfigError> {
    if let Some(value) = value {
        *slot = value.parse().map_err(|_| ConfigError::Invalid { key, value })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
