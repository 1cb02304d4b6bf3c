//! Factory: build the `Authorizer` for the configured trust model from application `Config`.
use std::sync::Arc;

use crate::config::{Config, TrustModel};
use crate::error::AppError;
use crate::services::auth::{
    Authorizer, ClaimsPolicy, CognitoVerifier, DecisionRenderer, DopplerSecretProvider,
    ResponseShape, SharedSecretVerifier, TokenVerifier,
};

pub fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, AppError> {
    let (verifier, policy, default_shape) = match config.trust_model {
        TrustModel::Cognito => {
            let verifier: Arc<dyn TokenVerifier> =
                Arc::new(CognitoVerifier::new(&config.cognito).map_err(|e| {
                    tracing::error!(error = %e, "failed to build signing key set client");
                    AppError::Internal
                })?);
            (
                verifier,
                ClaimsPolicy::access_only(),
                ResponseShape::WithContext,
            )
        }
        TrustModel::SharedSecret => {
            let settings = &config.shared_secret;
            let secrets = DopplerSecretProvider::new(
                settings.doppler_secrets_url.clone(),
                settings.doppler_token.clone(),
                settings.fetch_timeout,
            )
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build secrets client");
                AppError::Internal
            })?;
            let verifier: Arc<dyn TokenVerifier> = Arc::new(SharedSecretVerifier::new(
                Arc::new(secrets),
                settings.secret_lookup_key.clone(),
                settings.secret_default.clone(),
            ));
            (
                verifier,
                ClaimsPolicy::strict(settings.trusted_issuer.clone()),
                ResponseShape::BooleanOnly,
            )
        }
    };

    let shape = if config.always_include_context {
        ResponseShape::WithContext
    } else {
        default_shape
    };

    Ok(Arc::new(Authorizer::new(
        verifier,
        policy,
        DecisionRenderer::new(shape),
    )))
}
