// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator endpoints, authenticated by session bearer token.

use axum::async_trait;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use fleet_core::{CampaignId, HostSummary, UserId, UserPayload};
use fleet_wire::{CampaignResponse, RunQueryRequest, SearchTargetsRequest, SearchTargetsResponse, UserResponse};

use super::{ApiError, AppState};
use crate::live::{self, ws::WsTransport};
use crate::service::{ServiceError, Viewer};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?;
        Ok(state.service.authenticate_session(token).await?)
    }
}

pub(super) async fn run_query(
    viewer: Viewer,
    State(state): State<AppState>,
    Json(request): Json<RunQueryRequest>,
) -> ApiResult<CampaignResponse> {
    let campaign = state
        .service
        .new_distributed_query_campaign(&viewer, &request.query, &request.selected)
        .await?;
    Ok(Json(CampaignResponse { campaign }))
}

pub(super) async fn complete_query(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
) -> ApiResult<CampaignResponse> {
    let campaign = state.service.complete_campaign(&viewer, id).await?;
    Ok(Json(CampaignResponse { campaign }))
}

/// The session authenticates in-band with its first frame.
pub(super) async fn stream_results(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let AppState { service, cancel } = state;
    upgrade.on_upgrade(move |socket| live::run_session(service, WsTransport::new(socket), id, cancel))
}

pub(super) async fn search_targets(
    _viewer: Viewer,
    State(state): State<AppState>,
    Json(request): Json<SearchTargetsRequest>,
) -> ApiResult<SearchTargetsResponse> {
    Ok(Json(state.service.search_targets(&request).await?))
}

pub(super) async fn host_summary(_viewer: Viewer, State(state): State<AppState>) -> ApiResult<HostSummary> {
    Ok(Json(state.service.host_summary().await?))
}

pub(super) async fn get_user(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<UserResponse> {
    let user = state.service.get_user(&viewer, id).await?;
    Ok(Json(UserResponse { user }))
}

pub(super) async fn modify_user(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<UserResponse> {
    let user = state.service.modify_user(&viewer, id, &payload).await?;
    Ok(Json(UserResponse { user }))
}
