// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Prefix shared by every override variable, e.g. `FLEET_OSQUERY_ENROLL_SECRET`.
pub const OVERRIDE_PREFIX: &str = "FLEET_";

/// Config file path from `FLEET_CONFIG`, used when `--config` is not given.
pub fn config_path() -> Option<PathBuf> {
    var("FLEET_CONFIG").map(PathBuf::from)
}

/// Read a variable, treating empty values as unset.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Name of the variable overriding `section.key`.
pub fn override_name(section: &str, key: &str) -> String {
    format!("{OVERRIDE_PREFIX}{}_{}", section.to_ascii_uppercase(), key.to_ascii_uppercase())
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn log_filter() -> String {
    var("RUST_LOG").unwrap_or_else(|| "info".to_string())
}
