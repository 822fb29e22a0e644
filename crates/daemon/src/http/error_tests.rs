// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::service::InvalidArguments;
use http_body_util::BodyExt;

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[yare::parameterized(
    not_found    = { ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND },
    exists       = { ServiceError::AlreadyExists("x".into()), StatusCode::CONFLICT },
    conflict     = { ServiceError::Conflict("x".into()), StatusCode::CONFLICT },
    unauthorized = { ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED },
    node_invalid = { ServiceError::NodeInvalid("x".into()), StatusCode::UNAUTHORIZED },
    forbidden    = { ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN },
    unavailable  = { ServiceError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE },
    internal     = { ServiceError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR },
)]
fn status_mapping(err: ServiceError, expected: StatusCode) {
    assert_eq!(status_for(&err), expected);
}

#[tokio::test]
async fn validation_body_lists_fields() {
    let args = InvalidArguments::default().append("admin", "must be an admin").append("email", "bad");
    let response = ApiError(ServiceError::Invalid(args)).into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({
            "message": "Validation Failed",
            "errors": [
                {"name": "admin", "reason": "must be an admin"},
                {"name": "email", "reason": "bad"},
            ]
        })
    );
}

#[tokio::test]
async fn agent_errors_flag_node_invalid() {
    let response = AgentApiError(ServiceError::NodeInvalid("invalid node key".into())).into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "invalid node key", "node_invalid": true})
    );

    let response = AgentApiError(ServiceError::Unavailable("store down".into())).into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await, serde_json::json!({"error": "unavailable: store down"}));
}
