// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator sessions and user permissions.

use fleet_core::{Session, User, UserId, UserPayload};
use tracing::{debug, info};

use super::{InvalidArguments, Service, ServiceError, ServiceResult, StoreContext};

/// An authenticated operator: the user behind a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user: User,
    pub session: Session,
}

impl Viewer {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.admin
    }

    /// Whether the viewer may act on resources owned by `owner`.
    pub fn owns_or_admin(&self, owner: UserId) -> bool {
        self.is_admin() || self.user.id == owner
    }
}

pub fn must_be_admin(viewer: &Viewer) -> ServiceResult<()> {
    if viewer.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("must be an admin".to_string()))
    }
}

/// Any enabled operator may read any user.
pub fn can_read_user(viewer: &Viewer) -> ServiceResult<()> {
    if viewer.user.enabled {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("user is disabled".to_string()))
    }
}

pub fn can_modify_user(viewer: &Viewer, target: UserId) -> ServiceResult<()> {
    if viewer.owns_or_admin(target) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("no write permissions on user".to_string()))
    }
}

/// Field-level checks for a user update.
///
/// Admin-only fields fail for non-admins; self-service fields fail for
/// anyone who is neither the target nor an admin.
pub fn validate_modify_user(viewer: &Viewer, target: UserId, payload: &UserPayload) -> ServiceResult<()> {
    let mut invalid = InvalidArguments::default();

    if must_be_admin(viewer).is_err() {
        let admin_only = [
            ("enabled", payload.enabled.is_some()),
            ("admin", payload.admin.is_some()),
            ("force_password_reset", payload.force_password_reset.is_some()),
        ];
        for (name, present) in admin_only {
            if present {
                invalid.push(name, "must be an admin");
            }
        }
    }

    if !viewer.owns_or_admin(target) {
        let self_service = [
            ("username", payload.username.is_some()),
            ("name", payload.name.is_some()),
            ("email", payload.email.is_some()),
            ("gravatar_url", payload.gravatar_url.is_some()),
            ("position", payload.position.is_some()),
            ("password", payload.password.is_some()),
        ];
        for (name, present) in self_service {
            if present {
                invalid.push(name, "no write permissions on user");
            }
        }
    }

    if let Some(username) = &payload.username {
        if username.trim().is_empty() {
            invalid.push("username", "may not be empty");
        }
    }
    if let Some(email) = &payload.email {
        if !email.contains('@') {
            invalid.push("email", "must be an email address");
        }
    }

    invalid.into_result()
}

impl Service {
    /// Resolve a bearer token to its viewer.
    ///
    /// Expired sessions are deleted; disabled users are rejected.
    pub async fn authenticate_session(&self, token: &str) -> ServiceResult<Viewer> {
        if token.is_empty() {
            return Err(ServiceError::Unauthorized("missing session token".to_string()));
        }
        let session = match self.store.session_by_key(token).await {
            Ok(session) => session,
            Err(e) if e.is_not_found() => {
                return Err(ServiceError::Unauthorized("invalid session token".to_string()));
            }
            Err(e) => return Err(ServiceError::from(e)),
        };

        let now = self.clock.now();
        let idle = (now - session.accessed_at).to_std().unwrap_or_default();
        if idle > self.config.session.expiration() {
            debug!(session_id = %session.id, "session expired");
            self.store.delete_session(session.id).await.context("delete expired session")?;
            return Err(ServiceError::Unauthorized("session expired".to_string()));
        }

        let user = self.store.user(session.user_id).await.context("load session user")?;
        if !user.enabled {
            return Err(ServiceError::Unauthorized("user is disabled".to_string()));
        }

        self.store.mark_session_accessed(session.id, now).await.context("mark session accessed")?;
        let session = Session { accessed_at: now, ..session };
        Ok(Viewer { user, session })
    }

    pub async fn get_user(&self, viewer: &Viewer, id: UserId) -> ServiceResult<User> {
        can_read_user(viewer)?;
        self.store.user(id).await.context("get user")
    }

    pub async fn modify_user(&self, viewer: &Viewer, id: UserId, payload: &UserPayload) -> ServiceResult<User> {
        can_modify_user(viewer, id)?;
        validate_modify_user(viewer, id, payload)?;

        let mut user = self.store.user(id).await.context("get user")?;
        user.apply(payload);
        self.store.save_user(&user).await.context("save user")?;
        info!(user_id = %id, actor = %viewer.user_id(), "user modified");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
