// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleet-storage: Datastore contract and the in-memory implementation

mod datastore;
mod error;
mod state;

pub use datastore::Datastore;
pub use error::{StoreError, StoreResult};
pub use state::MemStore;
