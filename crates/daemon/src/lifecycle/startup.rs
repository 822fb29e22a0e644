// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::sync::Arc;

use fleet_core::SystemClock;
use fleet_storage::{Datastore, MemStore};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{Daemon, LifecycleError};
use crate::bus::{LocalBus, ResultStore};
use crate::config::Config;
use crate::logsink::{self, LogSink};
use crate::service::Service;

/// Build every collaborator and bind the listener.
pub async fn startup(config: Config) -> Result<Daemon, LifecycleError> {
    let config = Arc::new(config);

    // 1. Log sinks first: a bad path should fail before the port is taken
    let status_log = Arc::new(LogSink::open(&config.osquery.status_log_file)?);
    let result_log = Arc::new(LogSink::open(&config.osquery.result_log_file)?);

    // 2. Store and result bus
    let store: Arc<dyn Datastore> = Arc::new(MemStore::new());
    let bus: Arc<dyn ResultStore> = Arc::new(LocalBus::default());

    let service = Service::new(
        store,
        bus,
        Arc::clone(&status_log),
        Arc::clone(&result_log),
        Arc::new(SystemClock),
        Arc::clone(&config),
    );

    // 3. Periodic flush of buffered log records
    let cancel = CancellationToken::new();
    let sinks = vec![status_log, result_log];
    let flusher = tokio::spawn(logsink::run_flusher(
        sinks.clone(),
        config.osquery.log_flush_interval(),
        cancel.clone(),
    ));

    // 4. Bind (LAST - only after all validation passes)
    let listener = match TcpListener::bind(&config.server.address).await {
        Ok(listener) => listener,
        Err(e) => {
            cancel.cancel();
            return Err(LifecycleError::BindFailed(config.server.address.clone(), e));
        }
    };

    info!(
        addr = %config.server.address,
        status_log = %config.osquery.status_log_file.display(),
        result_log = %config.osquery.result_log_file.display(),
        "fleetd started"
    );
    Ok(Daemon { config, service, cancel, listener, sinks, flusher })
}
