// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet control plane daemon.
//!
//! Serves the agent protocol (enroll, config, distributed read/write, logs)
//! and the operator API, including live query websockets.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod config;
pub mod env;
pub mod http;
pub mod lifecycle;
pub mod live;
pub mod logsink;
pub mod service;

pub use bus::{BusError, BusMessage, LocalBus, ResultStore, Subscription};
pub use config::{Config, ConfigError};
pub use http::{router, AppState};
pub use lifecycle::{startup, LifecycleError};
pub use logsink::{LogSink, SinkError};
pub use service::{InvalidArguments, Service, ServiceError, Viewer};
