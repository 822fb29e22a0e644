// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! osquery TLS plugin endpoints.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::Json;
use fleet_core::Host;
use fleet_wire::{
    ConfigRequest, DistributedReadRequest, DistributedReadResponse, DistributedWriteRequest,
    EnrollRequest, EnrollResponse, HasNodeKey, LogRequest, OsqueryConfig,
};
use serde_json::{json, Value};

use super::{AgentApiError, AppState};
use crate::service::ServiceError;

type AgentResult<T> = Result<Json<T>, AgentApiError>;

/// JSON body whose rejections use the agent error shape.
pub(super) struct AgentJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AgentJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AgentApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(AgentJson(value)),
            Err(rejection) => Err(AgentApiError(ServiceError::invalid("body", rejection.body_text()))),
        }
    }
}

async fn authenticated(state: &AppState, request: &impl HasNodeKey) -> Result<Host, AgentApiError> {
    Ok(state.service.authenticate_host(request.node_key()).await?)
}

pub(super) async fn enroll(
    State(state): State<AppState>,
    AgentJson(request): AgentJson<EnrollRequest>,
) -> AgentResult<EnrollResponse> {
    let node_key = state.service.enroll_agent(&request.enroll_secret, &request.host_identifier).await?;
    Ok(Json(EnrollResponse { node_key, ..Default::default() }))
}

pub(super) async fn config(
    State(state): State<AppState>,
    AgentJson(request): AgentJson<ConfigRequest>,
) -> AgentResult<OsqueryConfig> {
    let host = authenticated(&state, &request).await?;
    Ok(Json(state.service.get_client_config(&host).await?))
}

pub(super) async fn distributed_read(
    State(state): State<AppState>,
    AgentJson(request): AgentJson<DistributedReadRequest>,
) -> AgentResult<DistributedReadResponse> {
    let host = authenticated(&state, &request).await?;
    Ok(Json(state.service.get_distributed_queries(&host).await?))
}

pub(super) async fn distributed_write(
    State(state): State<AppState>,
    AgentJson(request): AgentJson<DistributedWriteRequest>,
) -> AgentResult<Value> {
    let host = authenticated(&state, &request).await?;
    state
        .service
        .submit_distributed_query_results(&host, &request.queries, &request.statuses)
        .await?;
    Ok(Json(json!({})))
}

pub(super) async fn log(
    State(state): State<AppState>,
    AgentJson(request): AgentJson<LogRequest>,
) -> AgentResult<Value> {
    let host = authenticated(&state, &request).await?;
    state.service.submit_logs(&host, request.log_type, &request.data)?;
    Ok(Json(json!({})))
}
