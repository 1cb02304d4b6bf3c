use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::claims::Claims;
use super::error::AuthError;
use super::secrets::SecretProvider;
use super::verifier::TokenVerifier;
use crate::config::TrustModel;

/// HS256 verifier keyed by a shared secret.
///
/// Only the signature and the algorithm are checked here. `iss` and `exp` are
/// left to `ClaimsPolicy::strict`, so no registered claim is required and
/// neither is validated by `jsonwebtoken`.
///
/// The secret is resolved on every call; the provider decides whether that
/// means a network round trip.
pub struct SharedSecretVerifier {
    secrets: Arc<dyn SecretProvider>,
    lookup_key: String,
    default_secret: String,
    validation: Validation,
}

impl std::fmt::Debug for SharedSecretVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the default secret
        f.debug_struct("SharedSecretVerifier")
            .field("backend", &self.secrets.backend_name())
            .field("lookup_key", &self.lookup_key)
            .finish()
    }
}

impl SharedSecretVerifier {
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        lookup_key: impl Into<String>,
        default_secret: impl Into<String>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            secrets,
            lookup_key: lookup_key.into(),
            default_secret: default_secret.into(),
            validation,
        }
    }
}

#[async_trait]
impl TokenVerifier for SharedSecretVerifier {
    fn trust_model(&self) -> TrustModel {
        TrustModel::SharedSecret
    }

    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let secret = self
            .secrets
            .get(&self.lookup_key, &self.default_secret)
            .await;
        let key = DecodingKey::from_secret(secret.as_bytes());

        let data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation)?;
        Ok(data.claims)
    }
}
