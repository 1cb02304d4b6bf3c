//! Post-verification business rules.
//!
//! Checks run in a fixed order and stop at the first failure:
//! `token_use`, then (when configured) `iss`, then (when configured) `exp`.
//! `now` is passed in so the rules stay pure.

use super::claims::{Claims, claim_text};
use super::error::PolicyViolation;

pub const ACCESS_TOKEN_USE: &str = "access";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimsPolicy {
    // `None` when the verifier already pinned the issuer.
    trusted_issuer: Option<String>,
    // `false` when the verifier already enforced `exp`.
    check_expiry: bool,
}

impl ClaimsPolicy {
    /// Only `token_use`; issuer and expiry were enforced during verification.
    pub fn access_only() -> Self {
        Self::default()
    }

    /// `token_use`, the exact issuer, and `exp >= now`.
    pub fn strict(trusted_issuer: impl Into<String>) -> Self {
        Self {
            trusted_issuer: Some(trusted_issuer.into()),
            check_expiry: true,
        }
    }

    pub fn evaluate(&self, claims: &Claims, now: i64) -> Result<(), PolicyViolation> {
        if claims.token_use_str() != Some(ACCESS_TOKEN_USE) {
            return Err(PolicyViolation::InvalidTokenUse(claim_text(
                claims.token_use.as_ref(),
            )));
        }

        if let Some(trusted) = &self.trusted_issuer
            && claims.iss_str() != Some(trusted.as_str())
        {
            return Err(PolicyViolation::InvalidIssuer(claim_text(claims.iss.as_ref())));
        }

        if self.check_expiry && is_expired(claims.exp_seconds(), now) {
            return Err(PolicyViolation::Expired);
        }

        Ok(())
    }
}

// `exp == now` is still valid. A token without a numeric `exp` never is.
fn is_expired(exp: Option<f64>, now: i64) -> bool {
    match exp {
        Some(exp) => exp < now as f64,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const ISSUER: &str = "https://kredilatam.com/token-issuer";
    const NOW: i64 = 1_760_000_000;

    fn claims(token_use: Option<&str>, iss: Option<&str>, exp: Option<i64>) -> Claims {
        Claims {
            token_use: token_use.map(Value::from),
            iss: iss.map(Value::from),
            exp: exp.map(Value::from),
            ..Claims::default()
        }
    }

    #[test]
    fn access_only_ignores_issuer_and_expiry() {
        let policy = ClaimsPolicy::access_only();
        assert_eq!(
            policy.evaluate(&claims(Some("access"), Some("anything"), Some(0)), NOW),
            Ok(())
        );
    }

    #[test]
    fn token_use_must_be_access() {
        let policy = ClaimsPolicy::strict(ISSUER);
        assert_eq!(
            policy.evaluate(&claims(Some("id"), Some(ISSUER), Some(NOW + 60)), NOW),
            Err(PolicyViolation::InvalidTokenUse(Some("id".into())))
        );
        assert_eq!(
            ClaimsPolicy::access_only().evaluate(&claims(None, None, None), NOW),
            Err(PolicyViolation::InvalidTokenUse(None))
        );
    }

    #[test]
    fn token_use_is_checked_before_issuer() {
        let policy = ClaimsPolicy::strict(ISSUER);
        let err = policy
            .evaluate(&claims(Some("refresh"), Some("https://other"), None), NOW)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid token_use: refresh");
    }

    #[test]
    fn issuer_must_match_exactly() {
        let policy = ClaimsPolicy::strict(ISSUER);
        let err = policy
            .evaluate(
                &claims(Some("access"), Some("https://kredilatam.com/token-issuer/"), Some(NOW)),
                NOW,
            )
            .unwrap_err();
        assert_eq!(
            err,
            PolicyViolation::InvalidIssuer(Some("https://kredilatam.com/token-issuer/".into()))
        );

        assert_eq!(
            policy.evaluate(&claims(Some("access"), None, Some(NOW)), NOW),
            Err(PolicyViolation::InvalidIssuer(None))
        );
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let policy = ClaimsPolicy::strict(ISSUER);
        assert_eq!(
            policy.evaluate(&claims(Some("access"), Some(ISSUER), Some(NOW)), NOW),
            Ok(())
        );
        assert_eq!(
            policy.evaluate(&claims(Some("access"), Some(ISSUER), Some(NOW - 1)), NOW),
            Err(PolicyViolation::Expired)
        );
    }

    #[test]
    fn missing_exp_is_expired_under_strict_policy() {
        let policy = ClaimsPolicy::strict(ISSUER);
        assert_eq!(
            policy.evaluate(&claims(Some("access"), Some(ISSUER), None), NOW),
            Err(PolicyViolation::Expired)
        );
    }

    #[test]
    fn non_string_token_use_is_cited_by_value() {
        let policy = ClaimsPolicy::strict(ISSUER);
        let mut c = claims(None, Some(ISSUER), Some(NOW));
        c.token_use = Some(json!(1));

        let err = policy.evaluate(&c, NOW).unwrap_err();
        assert_eq!(err, PolicyViolation::InvalidTokenUse(Some("1".into())));
        assert_eq!(err.to_string(), "Invalid token_use: 1");
    }

    #[test]
    fn non_string_issuer_is_cited_by_value() {
        let policy = ClaimsPolicy::strict(ISSUER);
        let mut c = claims(Some("access"), None, Some(NOW));
        c.iss = Some(json!({"url": ISSUER}));

        assert_eq!(
            policy.evaluate(&c, NOW).unwrap_err().to_string(),
            format!("Invalid token_issuer: {{\"url\":\"{}\"}}", ISSUER)
        );
    }

    #[test]
    fn fractional_exp_is_compared_numerically() {
        let policy = ClaimsPolicy::strict(ISSUER);
        let mut c = claims(Some("access"), Some(ISSUER), None);

        c.exp = Some(json!(NOW as f64 + 0.5));
        assert_eq!(policy.evaluate(&c, NOW), Ok(()));

        c.exp = Some(json!(NOW as f64 - 0.5));
        assert_eq!(policy.evaluate(&c, NOW), Err(PolicyViolation::Expired));
    }

    #[test]
    fn non_numeric_exp_is_expired() {
        let policy = ClaimsPolicy::strict(ISSUER);
        let mut c = claims(Some("access"), Some(ISSUER), None);
        c.exp = Some(json!("2999-01-01"));
        assert_eq!(policy.evaluate(&c, NOW), Err(PolicyViolation::Expired));
    }
}
