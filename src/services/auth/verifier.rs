use async_trait::async_trait;

use super::claims::Claims;
use super::error::AuthError;
use crate::config::TrustModel;

/// Signature verification strategy, one per trust model.
///
/// Implementations resolve their own key material and return decoded claims
/// only when the token verified; they never return partial claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    fn trust_model(&self) -> TrustModel;

    /// Fails when the verifier cannot run at all (missing trust configuration).
    /// Checked before the token is even extracted.
    fn preflight(&self) -> Result<(), AuthError> {
        Ok(())
    }

    async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}
