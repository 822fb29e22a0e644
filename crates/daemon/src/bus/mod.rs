// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result bus: per-campaign publish/subscribe for live query rows.
//!
//! Delivery is at-most-once per subscriber and ordered within a subscriber.
//! Nothing is persisted; rows published with nobody listening are lost.

mod local;

pub use local::LocalBus;

use async_trait::async_trait;
use fleet_core::{CampaignId, DistributedQueryResult};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("no subscriber for campaign {0}")]
    NoSubscriber(CampaignId),

    #[error("result bus unavailable: {0}")]
    Unavailable(String),
}

/// Payload carried on a campaign channel.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    Result(DistributedQueryResult),
    /// Transport-level failure surfaced to the operator.
    Error(String),
}

/// Backing transport for campaign result channels.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Deliver to every live subscriber of `campaign_id`.
    ///
    /// Fails `NoSubscriber` when the campaign has none.
    async fn publish(&self, campaign_id: CampaignId, message: BusMessage) -> Result<(), BusError>;

    /// Open a channel receiving payloads published after this call.
    async fn subscribe(&self, campaign_id: CampaignId) -> Result<Subscription, BusError>;

    async fn health_check(&self) -> Result<(), BusError>;

    fn subscriber_count(&self, campaign_id: CampaignId) -> usize;
}

/// A live subscription. Dropping it unsubscribes.
pub struct Subscription {
    campaign_id: CampaignId,
    rx: mpsc::Receiver<BusMessage>,
    _release: Box<dyn Send + Sync>,
}

impl Subscription {
    pub fn new(
        campaign_id: CampaignId,
        rx: mpsc::Receiver<BusMessage>,
        release: impl Send + Sync + 'static,
    ) -> Self {
        Self { campaign_id, rx, _release: Box::new(release) }
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    /// Next payload in publication order. `None` once the bus drops the channel.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        self.rx.recv().await
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("campaign_id", &self.campaign_id).finish()
    }
}
