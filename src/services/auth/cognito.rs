use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation};

use super::claims::Claims;
use super::error::AuthError;
use super::jwks::{JwksError, JwksProvider};
use super::verifier::TokenVerifier;
use crate::config::{CognitoSettings, TrustModel};

/// RS256 verifier for Cognito user pool access tokens.
///
/// `jsonwebtoken::Validation` checks:
/// - signature against the key-set entry named by the header `kid`
/// - `exp` (with the configured leeway)
/// - `iss` equals the pool issuer URL
///
/// `aud` is not validated: Cognito access tokens do not carry it.
#[derive(Debug)]
pub struct CognitoVerifier {
    trust: Result<CognitoTrust, &'static str>,
}

#[derive(Debug)]
struct CognitoTrust {
    issuer: String,
    jwks: JwksProvider,
    validation: Validation,
}

impl CognitoVerifier {
    /// Incomplete settings still build a verifier; it denies every request in `preflight`.
    pub fn new(settings: &CognitoSettings) -> Result<Self, JwksError> {
        let trust = match (settings.is_complete(), settings.issuer(), settings.jwks_url()) {
            (true, Some(issuer), Some(jwks_url)) => {
                let jwks = JwksProvider::new(
                    jwks_url,
                    settings.fetch_timeout,
                    settings.jwks_cache_ttl,
                )?
                .with_refresh_cooldown(settings.jwks_refresh_cooldown);
                Ok(CognitoTrust {
                    validation: validation_for(&issuer, settings.leeway_seconds),
                    issuer,
                    jwks,
                })
            }
            _ => Err(missing_setting(settings)),
        };

        if let Err(missing) = &trust {
            tracing::warn!(missing = *missing, "cognito trust configuration incomplete; all requests will be denied");
        }

        Ok(Self { trust })
    }

    pub fn issuer(&self) -> Option<&str> {
        self.trust.as_ref().ok().map(|t| t.issuer.as_str())
    }

    fn trust(&self) -> Result<&CognitoTrust, AuthError> {
        self.trust
            .as_ref()
            .map_err(|missing| AuthError::Configuration { missing: *missing })
    }
}

fn validation_for(issuer: &str, leeway_seconds: u64) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[issuer]);
    validation.validate_aud = false;
    validation.leeway = leeway_seconds;
    validation
}

fn missing_setting(settings: &CognitoSettings) -> &'static str {
    let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
    if blank(&settings.user_pool_id) {
        "USER_POOL_ID"
    } else {
        "EXPECTED_AUDIENCE"
    }
}

#[async_trait]
impl TokenVerifier for CognitoVerifier {
    fn trust_model(&self) -> TrustModel {
        TrustModel::Cognito
    }

    fn preflight(&self) -> Result<(), AuthError> {
        self.trust().map(|_| ())
    }

    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let trust = self.trust()?;

        let header = jsonwebtoken::decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::KeyResolution("Token header is missing 'kid'".into()))?;

        let key = trust
            .jwks
            .get_key(&kid)
            .await
            .map_err(|e| AuthError::KeyResolution(e.to_string()))?;

        let data = jsonwebtoken::decode::<Claims>(token, &key, &trust.validation)?;
        Ok(data.claims)
    }
}
