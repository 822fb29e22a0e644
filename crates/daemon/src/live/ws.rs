// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Axum websocket transport for live sessions.

use std::borrow::Cow;

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use fleet_wire::Frame;

use super::{Close, Incoming, LiveError, Transport};

pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn recv(&mut self) -> Option<Result<Incoming, LiveError>> {
        loop {
            match self.socket.recv().await? {
                Ok(Message::Text(text)) => return Some(Ok(Incoming::Text(text))),
                Ok(Message::Close(_)) => return Some(Ok(Incoming::Close)),
                // Ping/Pong are answered by axum; binary frames are not part of the protocol
                Ok(_) => continue,
                Err(e) => return Some(Err(LiveError::Transport(e.to_string()))),
            }
        }
    }

    async fn send(&mut self, frame: &Frame) -> Result<(), LiveError> {
        let text = frame.encode()?;
        self.socket.send(Message::Text(text)).await.map_err(|e| LiveError::Transport(e.to_string()))
    }

    async fn close(&mut self, close: Close, reason: &str) -> Result<(), LiveError> {
        let frame = CloseFrame { code: close.code(), reason: Cow::Owned(reason.to_string()) };
        self.socket
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| LiveError::Transport(e.to_string()))
    }
}
