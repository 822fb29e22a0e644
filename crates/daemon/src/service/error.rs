// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fleet_storage::StoreError;
use fleet_wire::FieldError;
use thiserror::Error;

use crate::bus::BusError;

/// Failure of a service operation, classified by how callers should react.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("validation failed: {0}")]
    Invalid(InvalidArguments),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The agent's node key (or enroll secret) was rejected; it must re-enroll.
    #[error("{0}")]
    NodeInvalid(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ServiceError::Invalid(InvalidArguments::default().append(name, reason))
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ServiceError::NotFound(e.to_string()),
            StoreError::AlreadyExists { .. } => ServiceError::AlreadyExists(e.to_string()),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Unavailable(msg) => ServiceError::Unavailable(msg),
            StoreError::Invalid(msg) => ServiceError::invalid("base", msg),
        }
    }
}

impl From<BusError> for ServiceError {
    fn from(e: BusError) -> Self {
        ServiceError::Unavailable(e.to_string())
    }
}

/// Attach the failing operation to store errors.
pub(crate) trait StoreContext<T> {
    fn context(self, op: &str) -> Result<T, ServiceError>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, op: &str) -> Result<T, ServiceError> {
        self.map_err(|e| match ServiceError::from(e) {
            ServiceError::NotFound(msg) => ServiceError::NotFound(format!("{op}: {msg}")),
            ServiceError::AlreadyExists(msg) => ServiceError::AlreadyExists(format!("{op}: {msg}")),
            ServiceError::Conflict(msg) => ServiceError::Conflict(format!("{op}: {msg}")),
            ServiceError::Unavailable(msg) => ServiceError::Unavailable(format!("{op}: {msg}")),
            other => other,
        })
    }
}

/// Field-level validation failures, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidArguments(Vec<FieldError>);

impl InvalidArguments {
    pub fn append(mut self, name: &str, reason: impl Into<String>) -> Self {
        self.push(name, reason);
        self
    }

    pub fn push(&mut self, name: &str, reason: impl Into<String>) {
        self.0.push(FieldError { name: name.to_string(), reason: reason.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Err(Invalid)` if any field failed.
    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Invalid(self))
        }
    }
}

impl std::fmt::Display for InvalidArguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.name, error.reason)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
