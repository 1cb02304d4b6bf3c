/*
 * Responsibility
 * - POST /authorize: authorizer event JSON in, decision JSON out
 * - GET  /authorize?token=...: build the request record from the query string + headers
 * - Denials are 200 responses; only malformed events become AppError
 */
use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::HeaderMap,
};

use crate::error::AppError;
use crate::services::auth::{AuthorizerRequest, AuthorizerResponse};
use crate::state::AppState;

fn now_epoch_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

pub async fn authorize_event(
    State(state): State<AppState>,
    payload: Result<Json<AuthorizerRequest>, JsonRejection>,
) -> Result<Json<AuthorizerResponse>, AppError> {
    let Json(req) = payload?;

    let decision = state.authorizer.authorize(&req, now_epoch_seconds()).await;
    Ok(Json(decision))
}

pub async fn authorize_query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<AuthorizerResponse> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let req = AuthorizerRequest {
        identity_source: None,
        query_string_parameters: Some(params),
        headers: Some(headers),
    };

    Json(state.authorizer.authorize(&req, now_epoch_seconds()).await)
}
