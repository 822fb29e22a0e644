// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, serving, shutdown.

mod startup;
pub use startup::startup;

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::http::{router, AppState};
use crate::logsink::{LogSink, SinkError};
use crate::service::Service;

/// A started daemon: collaborators wired, listener bound, not yet serving.
pub struct Daemon {
    pub config: Arc<Config>,
    pub service: Service,
    /// Cancelling stops the server, live sessions, and the log flusher.
    pub cancel: CancellationToken,
    listener: TcpListener,
    sinks: Vec<Arc<LogSink>>,
    flusher: JoinHandle<()>,
}

impl Daemon {
    pub fn local_addr(&self) -> Result<SocketAddr, LifecycleError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve HTTP until `cancel` fires, then shut down.
    pub async fn serve(self) -> Result<(), LifecycleError> {
        let Daemon { config: _, service, cancel, listener, sinks, flusher } = self;
        let app = router(AppState::new(service, cancel.clone()));

        info!(addr = %listener.local_addr()?, "fleetd listening");
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(cancel.clone().cancelled_owned())
            .await;

        // Stop the flusher even when the server failed on its own.
        cancel.cancel();
        shutdown(sinks, flusher).await;
        served.map_err(LifecycleError::Serve)
    }
}

/// Final flush and close of the log sinks.
async fn shutdown(sinks: Vec<Arc<LogSink>>, flusher: JoinHandle<()>) {
    info!("shutting down fleetd");
    if let Err(e) = flusher.await {
        warn!(error = %e, "log flusher task failed");
    }
    for sink in sinks {
        if let Err(e) = sink.close() {
            warn!(path = %sink.path().display(), error = %e, "failed to close log sink");
        }
    }
    info!("fleetd shutdown complete");
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open log sink: {0}")]
    Sink(#[from] SinkError),

    #[error("failed to bind {0}: {1}")]
    BindFailed(String, #[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
