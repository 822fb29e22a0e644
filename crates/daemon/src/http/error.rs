// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_wire::{AgentError, ValidationErrorBody};
use serde::Serialize;
use tracing::{debug, error};

use crate::service::ServiceError;

fn status_for(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::AlreadyExists(_) | ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Unauthorized(_) | ServiceError::NodeInvalid(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_failure(e: &ServiceError, status: StatusCode) {
    if status.is_server_error() {
        error!(error = %e, %status, "request failed");
    } else {
        debug!(error = %e, %status, "request rejected");
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// Operator-facing error response.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        log_failure(&self.0, status);
        match self.0 {
            ServiceError::Invalid(args) => {
                let body = ValidationErrorBody {
                    message: "Validation Failed".to_string(),
                    errors: args.errors().to_vec(),
                };
                (status, Json(body)).into_response()
            }
            other => (status, Json(ErrorBody { message: other.to_string() })).into_response(),
        }
    }
}

/// Agent-facing error response; rejected node keys carry `node_invalid`.
#[derive(Debug)]
pub struct AgentApiError(pub ServiceError);

impl From<ServiceError> for AgentApiError {
    fn from(e: ServiceError) -> Self {
        AgentApiError(e)
    }
}

impl IntoResponse for AgentApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        log_failure(&self.0, status);
        let body = AgentError {
            node_invalid: matches!(self.0, ServiceError::NodeInvalid(_)),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
