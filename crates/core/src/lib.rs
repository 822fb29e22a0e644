// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleet-core: Domain model for the fleet control plane

pub mod macros;

pub mod campaign;
pub mod clock;
pub mod host;
pub mod id;
pub mod label;
pub mod query;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use campaign::{
    CampaignStatus, DistributedQueryCampaign, DistributedQueryExecution, DistributedQueryResult,
    ExecutionStatus, HostIdentity, Row, Target, TargetMetrics,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use host::{Host, HostStatus, HostSummary, MIA_CUTOFF};
pub use id::{CampaignId, DecoratorId, HostId, LabelId, PackId, ParseIdError, QueryId, SessionId, UserId};
pub use label::{Label, LabelMembership, LabelType};
pub use query::{
    Decorator, DecoratorType, OsqueryOptions, Pack, Query, ScheduledQuery, ScheduledQueryOptions,
};
pub use user::{Session, User, UserPayload};
