//! Authorization pipeline: extract -> verify -> claims policy -> render.
//!
//! `Authorizer::authorize` is the only place an `AuthError` turns into a
//! response. It never fails and holds no per-request state, so the same
//! request at the same `now` always yields the same decision.

use std::sync::Arc;

use super::claims::Claims;
use super::decision::{AuthorizerResponse, DecisionRenderer};
use super::error::AuthError;
use super::extract::{extract_token, token_prefix};
use super::policy::ClaimsPolicy;
use super::request::AuthorizerRequest;
use super::verifier::TokenVerifier;

#[derive(Clone)]
pub struct Authorizer {
    verifier: Arc<dyn TokenVerifier>,
    policy: ClaimsPolicy,
    renderer: DecisionRenderer,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("trust_model", &self.verifier.trust_model())
            .field("policy", &self.policy)
            .field("renderer", &self.renderer)
            .finish()
    }
}

impl Authorizer {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        policy: ClaimsPolicy,
        renderer: DecisionRenderer,
    ) -> Self {
        Self {
            verifier,
            policy,
            renderer,
        }
    }

    /// Decide on `req` as of `now` (epoch seconds).
    pub async fn authorize(&self, req: &AuthorizerRequest, now: i64) -> AuthorizerResponse {
        let outcome = self.evaluate(req, now).await;

        match &outcome {
            Ok(claims) => tracing::info!(
                trust_model = ?self.verifier.trust_model(),
                sub = %claims.sub_or_empty(),
                client_id = %claims.client_id_or_empty(),
                "request authorized"
            ),
            Err(AuthError::Configuration { missing }) => tracing::error!(
                missing = *missing,
                "authorizer trust configuration missing; denying"
            ),
            Err(err) => tracing::warn!(
                trust_model = ?self.verifier.trust_model(),
                kind = err.kind(),
                reason = %err,
                "request denied"
            ),
        }

        self.renderer.render(outcome)
    }

    async fn evaluate(&self, req: &AuthorizerRequest, now: i64) -> Result<Claims, AuthError> {
        // Refuse before looking at the request at all.
        self.verifier.preflight()?;

        let token = extract_token(req).ok_or(AuthError::TokenAbsent)?;
        tracing::debug!(
            token_prefix = token_prefix(token),
            headers = ?req.header_names(),
            "token extracted"
        );

        let claims = self.verifier.verify(token).await?;
        self.policy.evaluate(&claims, now)?;

        Ok(claims)
    }
}
