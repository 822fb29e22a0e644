// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live query sessions.
//!
//! One session streams one campaign to one operator: the client sends an
//! auth frame, then receives result frames as hosts report and a totals
//! frame every tick until the campaign stops running, the client leaves,
//! or the daemon shuts down.

pub mod ws;

use async_trait::async_trait;
use fleet_core::{CampaignId, CampaignStatus, DistributedQueryCampaign};
use fleet_wire::{Frame, ProtocolError, Totals};
use thiserror::Error;
use tokio::time::{timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::BusMessage;
use crate::service::{Service, ServiceError, Viewer};

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("transport: {0}")]
    Transport(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("timed out")]
    Timeout,
}

/// How a session ended, as reported to the client in the close frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Close {
    Normal,
    GoingAway,
    Policy,
}

impl Close {
    pub fn code(self) -> u16 {
        match self {
            Close::Normal => 1000,
            Close::GoingAway => 1001,
            Close::Policy => 1008,
        }
    }
}

/// A client message after transport framing is stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    Close,
}

/// Bidirectional message channel to one operator.
#[async_trait]
pub trait Transport: Send {
    /// Next client message; `None` once the connection is gone.
    async fn recv(&mut self) -> Option<Result<Incoming, LiveError>>;
    async fn send(&mut self, frame: &Frame) -> Result<(), LiveError>;
    async fn close(&mut self, close: Close, reason: &str) -> Result<(), LiveError>;
}

/// Drive one live session to completion.
pub async fn run_session<T: Transport>(
    service: Service,
    mut transport: T,
    campaign_id: CampaignId,
    cancel: CancellationToken,
) {
    let mut session = Session {
        io_timeout: service.config().live_query.io_timeout(),
        service,
        campaign_id,
        received: 0,
    };
    let close = match session.run(&mut transport, &cancel).await {
        Ok(close) => close,
        Err(Ended::Rejected(close, reason)) => {
            debug!(%campaign_id, %reason, "live session rejected");
            if session.send(&mut transport, &Frame::Error(reason)).await.is_err() {
                return;
            }
            close
        }
        Err(Ended::Gone(e)) => {
            debug!(%campaign_id, error = %e, "live session transport closed");
            return;
        }
    };
    match timeout(session.io_timeout, transport.close(close, "")).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(%campaign_id, error = %e, "close frame not delivered"),
        Err(_) => debug!(%campaign_id, "close frame timed out"),
    }
}

enum Ended {
    /// Tell the client why, then close.
    Rejected(Close, String),
    /// The connection is unusable; nothing more can be sent.
    Gone(LiveError),
}

impl From<LiveError> for Ended {
    fn from(e: LiveError) -> Self {
        Ended::Gone(e)
    }
}

struct Session {
    service: Service,
    campaign_id: CampaignId,
    io_timeout: std::time::Duration,
    received: u64,
}

impl Session {
    async fn run<T: Transport>(&mut self, transport: &mut T, cancel: &CancellationToken) -> Result<Close, Ended> {
        let viewer = self.authenticate(transport).await?;
        let campaign = self.running_campaign(&viewer).await?;
        let mut subscription = match self.service.bus().subscribe(campaign.id).await {
            Ok(subscription) => subscription,
            Err(e) => {
                let reason = format!("unable to subscribe: {e}");
                if let Err(fail) = self.service.fail_campaign(campaign.id, &reason).await {
                    warn!(campaign_id = %campaign.id, error = %fail, "failed to mark campaign failed");
                }
                return Err(Ended::Rejected(Close::Normal, reason));
            }
        };
        info!(campaign_id = %campaign.id, user_id = %viewer.user_id(), "live session started");

        let mut tick = tokio::time::interval(self.service.config().live_query.tick());
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(Close::GoingAway),
                message = subscription.recv() => match message {
                    Some(BusMessage::Result(result)) => {
                        self.received += 1;
                        self.send(transport, &Frame::Result(result)).await?;
                    }
                    Some(BusMessage::Error(reason)) => {
                        self.send(transport, &Frame::Error(reason)).await?;
                    }
                    None => return Ok(Close::GoingAway),
                },
                _ = tick.tick() => {
                    if !self.tick(transport).await? {
                        info!(campaign_id = %self.campaign_id, "campaign finished, ending live session");
                        return Ok(Close::Normal);
                    }
                }
                incoming = transport.recv() => match incoming {
                    Some(Ok(Incoming::Text(_))) => {}
                    Some(Ok(Incoming::Close)) | None => return Err(Ended::Gone(LiveError::Transport("client left".into()))),
                    Some(Err(e)) => return Err(Ended::Gone(e)),
                },
            }
        }
    }

    /// First frame must be an auth frame carrying a valid session token.
    async fn authenticate<T: Transport>(&self, transport: &mut T) -> Result<Viewer, Ended> {
        let text = match timeout(self.io_timeout, transport.recv()).await {
            Err(_) => {
                return Err(Ended::Rejected(Close::Policy, "timed out waiting for auth".to_string()));
            }
            Ok(Some(Ok(Incoming::Text(text)))) => text,
            Ok(Some(Ok(Incoming::Close)) | None) => {
                return Err(Ended::Gone(LiveError::Transport("client left before auth".into())));
            }
            Ok(Some(Err(e))) => return Err(Ended::Gone(e)),
        };
        let token = Frame::decode_auth(&text)
            .map_err(|e| Ended::Rejected(Close::Policy, format!("expected auth frame: {e}")))?;
        self.service
            .authenticate_session(&token)
            .await
            .map_err(|e| Ended::Rejected(Close::Policy, e.to_string()))
    }

    async fn running_campaign(&self, viewer: &Viewer) -> Result<DistributedQueryCampaign, Ended> {
        let campaign = match self.service.campaign(self.campaign_id).await {
            Ok(campaign) => campaign,
            Err(ServiceError::NotFound(_)) => {
                let reason = format!("cannot find campaign for ID {}", self.campaign_id);
                return Err(Ended::Rejected(Close::Normal, reason));
            }
            Err(e) => return Err(Ended::Rejected(Close::Normal, e.to_string())),
        };
        if !viewer.owns_or_admin(campaign.user_id) {
            return Err(Ended::Rejected(Close::Policy, "campaign belongs to another user".to_string()));
        }
        if campaign.status != CampaignStatus::Running {
            let reason = format!("campaign {} not running", self.campaign_id);
            return Err(Ended::Rejected(Close::Normal, reason));
        }
        Ok(campaign)
    }

    /// Send totals; `false` once the campaign has stopped running.
    async fn tick<T: Transport>(&mut self, transport: &mut T) -> Result<bool, Ended> {
        match self.service.campaign_metrics(self.campaign_id).await {
            Ok(metrics) => {
                self.send(transport, &Frame::Totals(Totals::new(metrics, self.received))).await?;
            }
            Err(e) => warn!(campaign_id = %self.campaign_id, error = %e, "failed to count targets"),
        }
        match self.service.campaign(self.campaign_id).await {
            Ok(campaign) => Ok(campaign.status == CampaignStatus::Running),
            Err(ServiceError::NotFound(_)) => Ok(false),
            Err(e) => {
                warn!(campaign_id = %self.campaign_id, error = %e, "failed to load campaign");
                Ok(true)
            }
        }
    }

    async fn send<T: Transport>(&self, transport: &mut T, frame: &Frame) -> Result<(), LiveError> {
        match timeout(self.io_timeout, transport.send(frame)).await {
            Ok(result) => result,
            Err(_) => Err(LiveError::Timeout),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
