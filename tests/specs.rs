//! End-to-end scenarios for the fleet control plane.
//!
//! Each scenario drives the HTTP router the way osquery agents and
//! operators do, against an in-memory store and a fake clock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/agent/mod.rs"]
mod agent;

#[path = "specs/operator/mod.rs"]
mod operator;
