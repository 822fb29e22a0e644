// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control plane operations shared by the HTTP and websocket layers.
//!
//! [`Service`] holds every collaborator (store, result bus, log sinks, clock,
//! configuration); nothing is process-global.

mod agent;
mod campaigns;
pub mod details;
mod error;
mod identity;
mod targets;
mod users;

pub use error::{InvalidArguments, ServiceError};
pub(crate) use error::StoreContext;
pub use users::Viewer;

use std::sync::Arc;

use fleet_core::Clock;
use fleet_storage::Datastore;

use crate::bus::ResultStore;
use crate::config::Config;
use crate::logsink::LogSink;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct Service {
    store: Arc<dyn Datastore>,
    bus: Arc<dyn ResultStore>,
    status_log: Arc<LogSink>,
    result_log: Arc<LogSink>,
    clock: Arc<dyn Clock>,
    config: Arc<Config>,
}

impl Service {
    pub fn new(
        store: Arc<dyn Datastore>,
        bus: Arc<dyn ResultStore>,
        status_log: Arc<LogSink>,
        result_log: Arc<LogSink>,
        clock: Arc<dyn Clock>,
        config: Arc<Config>,
    ) -> Self {
        Self { store, bus, status_log, result_log, clock, config }
    }

    pub fn store(&self) -> &Arc<dyn Datastore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<dyn ResultStore> {
        &self.bus
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Push buffered log records to disk.
    pub fn flush_logs(&self) -> ServiceResult<()> {
        for sink in [&self.status_log, &self.result_log] {
            sink.flush().map_err(|e| ServiceError::Unavailable(format!("flush {}: {e}", sink.path().display())))?;
        }
        Ok(())
    }

    /// Check that the store and the result bus respond.
    pub async fn health(&self) -> (bool, bool) {
        let store = self.store.health_check().await.is_ok();
        let bus = self.bus.health_check().await.is_ok();
        (store, bus)
    }
}

#[cfg(test)]
pub(crate) mod test_helpers;
