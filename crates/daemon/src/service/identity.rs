// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent enrollment and node key authentication.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fleet_core::{Host, HostSummary};
use fleet_storage::StoreError;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

use super::{Service, ServiceError, ServiceResult, StoreContext};

/// Fresh keys tried before giving up on a colliding key space.
const ENROLL_ATTEMPTS: usize = 3;

/// `size` random bytes, base64 encoded.
pub fn generate_node_key(size: usize) -> String {
    let mut bytes = vec![0u8; size];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

impl Service {
    /// Enroll (or re-enroll) the agent identified by `host_identifier`.
    ///
    /// Returns a new node key; any key issued before stops authenticating.
    pub async fn enroll_agent(&self, enroll_secret: &str, host_identifier: &str) -> ServiceResult<String> {
        if enroll_secret != self.config.osquery.enroll_secret {
            debug!(host_identifier, "enroll rejected: bad secret");
            return Err(ServiceError::NodeInvalid("Invalid enroll secret".to_string()));
        }
        if host_identifier.is_empty() {
            return Err(ServiceError::invalid("host_identifier", "Missing host identifier"));
        }
        let size = self.config.osquery.node_key_size;
        if size == 0 {
            return Err(ServiceError::invalid("node_key_size", "must be greater than zero"));
        }

        let now = self.clock.now();
        for _ in 0..ENROLL_ATTEMPTS {
            let node_key = generate_node_key(size);
            match self.store.enroll_host(host_identifier, &node_key, now).await {
                Ok(host) => {
                    info!(host_id = %host.id, host_identifier, "host enrolled");
                    return Ok(node_key);
                }
                Err(StoreError::AlreadyExists { .. }) => {
                    debug!(host_identifier, "node key collision, retrying");
                }
                Err(e) => return Err(ServiceError::from(e)),
            }
        }
        Err(ServiceError::Internal(format!(
            "no unique node key after {ENROLL_ATTEMPTS} attempts"
        )))
    }

    /// Resolve `node_key` to its host and mark the host seen now.
    ///
    /// Unknown or rotated keys fail `NodeInvalid`.
    pub async fn authenticate_host(&self, node_key: &str) -> ServiceResult<Host> {
        if node_key.is_empty() {
            return Err(ServiceError::NodeInvalid("missing node key".to_string()));
        }
        let mut host = match self.store.authenticate_host(node_key).await {
            Ok(host) => host,
            Err(e) if e.is_not_found() => {
                debug!("authentication failed: unknown node key");
                return Err(ServiceError::NodeInvalid("invalid node key".to_string()));
            }
            Err(e) => return Err(ServiceError::from(e)),
        };

        let now = self.clock.now();
        self.store.mark_host_seen(host.id, now).await.context("mark host seen")?;
        host.seen_time = now;
        Ok(host)
    }

    /// Online/offline/MIA counts across the fleet.
    pub async fn host_summary(&self) -> ServiceResult<HostSummary> {
        let now = self.clock.now();
        self.store.host_status_summary(now).await.context("host status summary")
    }
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
