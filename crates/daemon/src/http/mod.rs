// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: agent endpoints under `/api/v1/osquery`, operator
//! endpoints under `/api/v1/kolide`, and `/healthz`.

mod agent;
mod error;
mod operator;

pub use error::{AgentApiError, ApiError};

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fleet_wire::HealthResponse;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::service::Service;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Shared per-request context.
#[derive(Clone)]
pub struct AppState {
    pub service: Service,
    /// Cancelled at shutdown; live sessions watch it.
    pub cancel: CancellationToken,
}

impl AppState {
    pub fn new(service: Service, cancel: CancellationToken) -> Self {
        Self { service, cancel }
    }
}

pub fn router(state: AppState) -> Router {
    let agent = Router::new()
        .route("/enroll", post(agent::enroll))
        .route("/config", post(agent::config))
        .route("/distributed/read", post(agent::distributed_read))
        .route("/distributed/write", post(agent::distributed_write))
        .route("/log", post(agent::log));

    let operator = Router::new()
        .route("/queries/run", post(operator::run_query))
        .route("/distributed-queries", post(operator::run_query))
        .route("/queries/run/:id/complete", post(operator::complete_query))
        .route("/results/:id", get(operator::stream_results))
        .route("/targets", post(operator::search_targets))
        .route("/host_summary", get(operator::host_summary))
        .route("/users/:id", get(operator::get_user).patch(operator::modify_user));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api/v1/osquery", agent)
        .nest("/api/v1/kolide", operator)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT)),
        )
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (store, bus) = state.service.health().await;
    let status = if store && bus { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(HealthResponse { store, bus }))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
