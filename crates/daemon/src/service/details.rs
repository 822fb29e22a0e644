// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detail queries: the fixed family that teaches the server a host's
//! platform, versions and hardware.
//!
//! Each entry pairs the SQL sent to the agent with a pure function folding
//! the returned rows into [`Host`] fields.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use fleet_core::{Host, Row};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailError {
    #[error("unknown detail query {0:?}")]
    Unknown(String),

    #[error("{query}: expected {expected} row(s), got {got}")]
    RowCount { query: &'static str, expected: &'static str, got: usize },

    #[error("{query}: invalid {column} value {value:?}")]
    Field { query: &'static str, column: &'static str, value: String },
}

type Ingest = fn(&mut Host, &[Row]) -> Result<(), DetailError>;

pub struct DetailQuery {
    pub name: &'static str,
    pub sql: &'static str,
    ingest: Ingest,
}

impl DetailQuery {
    pub fn ingest(&self, host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
        (self.ingest)(host, rows)
    }
}

pub const DETAIL_QUERIES: &[DetailQuery] = &[
    DetailQuery {
        name: "network_interface",
        sql: "select * from interface_details id join interface_addresses ia \
              on ia.interface = id.interface where length(mac) > 0 \
              order by (ibytes + obytes) desc",
        ingest: ingest_network_interface,
    },
    DetailQuery {
        name: "os_version",
        sql: "select * from os_version limit 1",
        ingest: ingest_os_version,
    },
    DetailQuery {
        name: "osquery_flags",
        sql: "select name, value from osquery_flags where name in \
              ('distributed_interval', 'config_tls_refresh', 'logger_tls_period')",
        ingest: ingest_osquery_flags,
    },
    DetailQuery {
        name: "osquery_info",
        sql: "select * from osquery_info limit 1",
        ingest: ingest_osquery_info,
    },
    DetailQuery {
        name: "system_info",
        sql: "select * from system_info limit 1",
        ingest: ingest_system_info,
    },
    DetailQuery {
        name: "uptime",
        sql: "select * from uptime limit 1",
        ingest: ingest_uptime,
    },
];

pub fn find(name: &str) -> Option<&'static DetailQuery> {
    DETAIL_QUERIES.iter().find(|q| q.name == name)
}

/// Fold the rows of detail query `name` into `host`.
///
/// All or nothing: on error `host` is left untouched.
pub fn ingest(name: &str, host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
    let query = find(name).ok_or_else(|| DetailError::Unknown(name.to_string()))?;
    let mut staged = host.clone();
    query.ingest(&mut staged, rows)?;
    *host = staged;
    Ok(())
}

fn single<'a>(query: &'static str, rows: &'a [Row]) -> Result<&'a Row, DetailError> {
    match rows {
        [row] => Ok(row),
        _ => Err(DetailError::RowCount { query, expected: "1", got: rows.len() }),
    }
}

fn text(row: &Row, column: &str) -> String {
    row.get(column).cloned().unwrap_or_default()
}

/// Numeric column; missing or empty parses as zero.
fn number<T: FromStr + Default>(
    query: &'static str,
    row: &Row,
    column: &'static str,
) -> Result<T, DetailError> {
    match row.get(column).map(|v| v.trim()) {
        None | Some("") => Ok(T::default()),
        Some(value) => value.parse().map_err(|_| DetailError::Field {
            query,
            column,
            value: value.to_string(),
        }),
    }
}

fn ingest_system_info(host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
    const Q: &str = "system_info";
    let row = single(Q, rows)?;
    host.physical_memory = number(Q, row, "physical_memory")?;
    host.cpu_physical_cores = number(Q, row, "cpu_physical_cores")?;
    host.cpu_logical_cores = number(Q, row, "cpu_logical_cores")?;
    host.host_name = text(row, "hostname");
    host.uuid = text(row, "uuid");
    host.cpu_type = text(row, "cpu_type");
    host.cpu_subtype = text(row, "cpu_subtype");
    host.cpu_brand = text(row, "cpu_brand");
    host.hardware_vendor = text(row, "hardware_vendor");
    host.hardware_model = text(row, "hardware_model");
    host.hardware_version = text(row, "hardware_version");
    host.hardware_serial = text(row, "hardware_serial");
    host.computer_name = text(row, "computer_name");
    Ok(())
}

fn ingest_os_version(host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
    let row = single("os_version", rows)?;
    host.os_version = format!(
        "{} {}.{}.{}",
        text(row, "name"),
        text(row, "major"),
        text(row, "minor"),
        text(row, "patch")
    )
    .trim()
    .to_string();
    host.os_build = text(row, "build");
    Ok(())
}

fn ingest_osquery_info(host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
    let row = single("osquery_info", rows)?;
    host.platform = text(row, "build_platform");
    host.osquery_version = text(row, "version");
    Ok(())
}

fn ingest_uptime(host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
    const Q: &str = "uptime";
    let row = single(Q, rows)?;
    host.uptime = Duration::from_secs(number(Q, row, "total_seconds")?);
    Ok(())
}

/// Rows arrive ordered by traffic; the busiest routable IPv4 address wins,
/// falling back to IPv6.
fn ingest_network_interface(host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
    if rows.is_empty() {
        return Err(DetailError::RowCount {
            query: "network_interface",
            expected: "at least 1",
            got: 0,
        });
    }

    let mut first_v4 = None;
    let mut first_v6 = None;
    for row in rows {
        let Ok(ip) = text(row, "address").parse::<IpAddr>() else {
            continue;
        };
        if !is_routable(&ip) {
            continue;
        }
        match ip {
            IpAddr::V4(_) if first_v4.is_none() => first_v4 = Some(row),
            IpAddr::V6(_) if first_v6.is_none() => first_v6 = Some(row),
            _ => {}
        }
    }

    if let Some(row) = first_v4.or(first_v6) {
        host.primary_ip = text(row, "address");
        host.primary_mac = text(row, "mac");
    }
    Ok(())
}

fn is_routable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => !(v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()),
        IpAddr::V6(v6) => {
            let link_local = (v6.segments()[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || link_local)
        }
    }
}

fn ingest_osquery_flags(host: &mut Host, rows: &[Row]) -> Result<(), DetailError> {
    const Q: &str = "osquery_flags";
    for row in rows {
        let slot = match row.get("name").map(String::as_str) {
            Some("distributed_interval") => &mut host.distributed_interval,
            Some("config_tls_refresh") => &mut host.config_tls_refresh,
            Some("logger_tls_period") => &mut host.logger_tls_period,
            _ => continue,
        };
        *slot = number(Q, row, "value")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "details_tests.rs"]
mod tests;
