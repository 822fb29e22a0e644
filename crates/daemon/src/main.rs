// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fleetd: fleet control plane daemon.

use std::path::PathBuf;

use clap::Parser;
use fleet_daemon::{env, startup, Config};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fleetd", version, about = "Fleet control plane for osquery agents")]
struct Args {
    /// TOML configuration file (defaults to $FLEET_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Install the global subscriber; the guard must outlive the process.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match &config.logging.file {
        Some(path) => {
            let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            let name = path.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("fleetd.log"));
            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry.with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false)).init();
            Some(guard)
        }
        None => {
            registry.with(tracing_subscriber::fmt::layer()).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let path = args.config.or_else(env::config_path);
    let config = Config::load(path.as_deref())?;
    let _guard = init_tracing(&config);

    let daemon = startup(config).await?;
    let cancel = daemon.cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("received interrupt"),
            Err(e) => tracing::warn!(error = %e, "failed to listen for interrupt"),
        }
        cancel.cancel();
    });

    daemon.serve().await?;
    Ok(())
}
