// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process result bus.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use fleet_core::CampaignId;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use super::{BusError, BusMessage, ResultStore, Subscription};

/// Buffered payloads per subscriber before new ones are dropped.
pub const DEFAULT_BUFFER: usize = 256;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<BusMessage>,
}

#[derive(Default)]
struct Channels {
    next_id: u64,
    by_campaign: HashMap<CampaignId, Vec<Subscriber>>,
}

/// Result bus backed by one bounded channel per subscriber.
///
/// Publishing never blocks: a subscriber whose buffer is full misses the
/// payload.
#[derive(Clone)]
pub struct LocalBus {
    channels: Arc<Mutex<Channels>>,
    buffer: usize,
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER)
    }
}

impl LocalBus {
    pub fn new(buffer: usize) -> Self {
        Self { channels: Arc::new(Mutex::new(Channels::default())), buffer: buffer.max(1) }
    }

    /// Number of campaigns with at least one subscriber.
    #[cfg(test)]
    pub fn open_channels(&self) -> usize {
        self.channels.lock().by_campaign.len()
    }
}

/// Removes its subscriber from the bus on drop.
struct Release {
    channels: Weak<Mutex<Channels>>,
    campaign_id: CampaignId,
    id: u64,
}

impl Drop for Release {
    fn drop(&mut self) {
        let Some(channels) = self.channels.upgrade() else {
            return;
        };
        let mut channels = channels.lock();
        if let Some(subscribers) = channels.by_campaign.get_mut(&self.campaign_id) {
            subscribers.retain(|s| s.id != self.id);
            if subscribers.is_empty() {
                channels.by_campaign.remove(&self.campaign_id);
                debug!(campaign_id = %self.campaign_id, "released campaign channel");
            }
        }
    }
}

#[async_trait]
impl ResultStore for LocalBus {
    async fn publish(&self, campaign_id: CampaignId, message: BusMessage) -> Result<(), BusError> {
        let channels = self.channels.lock();
        let subscribers = match channels.by_campaign.get(&campaign_id) {
            Some(subscribers) if !subscribers.is_empty() => subscribers,
            _ => return Err(BusError::NoSubscriber(campaign_id)),
        };

        for subscriber in subscribers {
            match subscriber.tx.try_send(message.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!(%campaign_id, subscriber = subscriber.id, "subscriber lagging, payload dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        Ok(())
    }

    async fn subscribe(&self, campaign_id: CampaignId) -> Result<Subscription, BusError> {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = {
            let mut channels = self.channels.lock();
            channels.next_id += 1;
            let id = channels.next_id;
            channels.by_campaign.entry(campaign_id).or_default().push(Subscriber { id, tx });
            id
        };
        let release = Release { channels: Arc::downgrade(&self.channels), campaign_id, id };
        Ok(Subscription::new(campaign_id, rx, release))
    }

    async fn health_check(&self) -> Result<(), BusError> {
        Ok(())
    }

    fn subscriber_count(&self, campaign_id: CampaignId) -> usize {
        self.channels.lock().by_campaign.get(&campaign_id).map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
