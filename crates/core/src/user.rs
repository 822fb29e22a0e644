// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator accounts and their login sessions.

use crate::id::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub admin: bool,
    pub enabled: bool,
    #[serde(default)]
    pub force_password_reset: bool,
    #[serde(default)]
    pub gravatar_url: String,
    #[serde(default)]
    pub position: String,
}

impl User {
    /// Apply the fields present in `payload`.
    ///
    /// `password` is not stored on the user record and is ignored here.
    pub fn apply(&mut self, payload: &UserPayload) {
        if let Some(username) = &payload.username {
            self.username = username.clone();
        }
        if let Some(name) = &payload.name {
            self.name = name.clone();
        }
        if let Some(email) = &payload.email {
            self.email = email.clone();
        }
        if let Some(admin) = payload.admin {
            self.admin = admin;
        }
        if let Some(enabled) = payload.enabled {
            self.enabled = enabled;
        }
        if let Some(reset) = payload.force_password_reset {
            self.force_password_reset = reset;
        }
        if let Some(url) = &payload.gravatar_url {
            self.gravatar_url = url.clone();
        }
        if let Some(position) = &payload.position {
            self.position = position.clone();
        }
    }
}

/// Partial update of a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_password_reset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    /// Bearer token presented by the operator.
    pub key: String,
    pub accessed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

crate::builder! {
    pub struct UserBuilder => User {
        into {
            username: String = "admin",
            name: String = "Admin",
            email: String = "admin@example.com",
            gravatar_url: String = "",
            position: String = "",
        }
        set {
            id: UserId = UserId::default(),
            admin: bool = false,
            enabled: bool = true,
            force_password_reset: bool = false,
        }
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
