/*
 * Responsibility
 * - v1 URL layout
 * - /authorize accepts an authorizer event (POST) or a plain query string (GET, local use)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    authorize::{authorize_event, authorize_query},
    health::health,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/authorize", get(authorize_query).post(authorize_event))
}
