// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator users and sessions.

use chrono::{DateTime, Utc};
use fleet_core::{Session, SessionId, User, UserId};

use super::MemState;
use crate::{StoreError, StoreResult};

impl MemState {
    pub(super) fn new_user(&mut self, mut user: User) -> StoreResult<User> {
        if self.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::already_exists(UserId::KIND, &user.username));
        }
        user.id = UserId::new(self.next_id(UserId::KIND));
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub(super) fn user(&self, id: UserId) -> StoreResult<User> {
        self.users.get(&id).cloned().ok_or_else(|| StoreError::not_found(UserId::KIND, id))
    }

    pub(super) fn save_user(&mut self, user: &User) -> StoreResult<()> {
        if !self.users.contains_key(&user.id) {
            return Err(StoreError::not_found(UserId::KIND, user.id));
        }
        if self.users.values().any(|u| u.id != user.id && u.username == user.username) {
            return Err(StoreError::already_exists(UserId::KIND, &user.username));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    pub(super) fn new_session(
        &mut self,
        user_id: UserId,
        key: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Session> {
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::not_found(UserId::KIND, user_id));
        }
        if key.is_empty() {
            return Err(StoreError::Invalid("session key must not be empty".to_string()));
        }
        if self.sessions.values().any(|s| s.key == key) {
            return Err(StoreError::already_exists(SessionId::KIND, "<redacted>"));
        }
        let session = Session {
            id: SessionId::new(self.next_id(SessionId::KIND)),
            user_id,
            key: key.to_string(),
            accessed_at: now,
            created_at: now,
        };
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    pub(super) fn session_by_key(&self, key: &str) -> StoreResult<Session> {
        self.sessions
            .values()
            .find(|s| !key.is_empty() && s.key == key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(SessionId::KIND, "<redacted>"))
    }

    pub(super) fn mark_session_accessed(&mut self, id: SessionId, at: DateTime<Utc>) -> StoreResult<()> {
        let session =
            self.sessions.get_mut(&id).ok_or_else(|| StoreError::not_found(SessionId::KIND, id))?;
        session.accessed_at = at;
        Ok(())
    }

    pub(super) fn delete_session(&mut self, id: SessionId) -> StoreResult<()> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(SessionId::KIND, id))
    }
}
