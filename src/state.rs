/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - authorizer: built once from Config, shared across requests
 * - Clone-cheap (Arc inside)
 */
use std::sync::Arc;

use crate::services::auth::Authorizer;

#[derive(Clone, Debug)]
pub struct AppState {
    pub authorizer: Arc<Authorizer>,
}

impl AppState {
    pub fn new(authorizer: Arc<Authorizer>) -> Self {
        Self { authorizer }
    }
}
