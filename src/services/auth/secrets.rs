//! Shared-secret resolution for the symmetric trust model.
//!
//! A provider never fails: any backend problem degrades to the caller's
//! default and is logged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

#[async_trait]
pub trait SecretProvider: Send + Sync {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    /// Value for `key`, or `default` when the backend is unreachable or the key is absent.
    async fn get(&self, key: &str, default: &str) -> String;
}

/// Internal provider failures. These never leave the provider.
#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("secrets request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("secrets endpoint returned status {0}")]
    Status(StatusCode),
}

/// Doppler `secrets/download` client.
///
/// - One request per lookup, bounded by `timeout`.
/// - Without a service token the provider short-circuits to the default.
#[derive(Clone)]
pub struct DopplerSecretProvider {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for DopplerSecretProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the service token
        f.debug_struct("DopplerSecretProvider")
            .field("url", &self.url.as_str())
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl DopplerSecretProvider {
    pub fn new(url: Url, token: Option<String>, timeout: Duration) -> Result<Self, SecretsError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client, url, token })
    }

    async fn fetch(&self, token: &str, key: &str) -> Result<Option<String>, SecretsError> {
        let resp = self
            .client
            .get(self.url.clone())
            .bearer_auth(token)
            .query(&[("format", "json")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SecretsError::Status(resp.status()));
        }

        let secrets: Map<String, Value> = resp.json().await?;
        Ok(secrets.get(key).and_then(Value::as_str).map(str::to_string))
    }
}

#[async_trait]
impl SecretProvider for DopplerSecretProvider {
    fn backend_name(&self) -> &'static str {
        "doppler"
    }

    async fn get(&self, key: &str, default: &str) -> String {
        let Some(token) = self.token.as_deref() else {
            tracing::warn!(key, "no secrets service token configured; using default secret");
            return default.to_string();
        };

        match self.fetch(token, key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::warn!(key, "secret not present in provider; using default secret");
                default.to_string()
            }
            Err(err) => {
                tracing::warn!(error = %err, key, "secrets provider unavailable; using default secret");
                default.to_string()
            }
        }
    }
}

/// Fixed in-process secrets. Keys not in the map resolve to the default.
#[derive(Clone, Default)]
pub struct StaticSecretProvider {
    values: Map<String, Value>,
}

impl StaticSecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), Value::String(value.into()));
        self
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    fn backend_name(&self) -> &'static str {
        "static"
    }

    async fn get(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_falls_back_to_default() {
        let provider = StaticSecretProvider::new().with("JWT_DOPPLER_SECRET", "s3cret");
        assert_eq!(provider.get("JWT_DOPPLER_SECRET", "dev").await, "s3cret");
        assert_eq!(provider.get("OTHER", "dev").await, "dev");
    }

    #[tokio::test]
    async fn doppler_without_token_returns_default_without_network() {
        // Unroutable URL: any request attempt would fail, but none is made.
        let provider = DopplerSecretProvider::new(
            Url::parse("http://127.0.0.1:9/secrets").unwrap(),
            None,
            Duration::from_millis(50),
        )
        .unwrap();
        assert_eq!(provider.get("JWT_DOPPLER_SECRET", "dev-secret-key").await, "dev-secret-key");
    }

    #[tokio::test]
    async fn doppler_unreachable_degrades_to_default() {
        let provider = DopplerSecretProvider::new(
            Url::parse("http://127.0.0.1:9/secrets").unwrap(),
            Some("dp.st.test".into()),
            Duration::from_millis(200),
        )
        .unwrap();
        assert_eq!(provider.get("JWT_DOPPLER_SECRET", "fallback").await, "fallback");
    }

    #[test]
    fn debug_redacts_token() {
        let provider = DopplerSecretProvider::new(
            Url::parse("https://api.doppler.com/v3/configs/config/secrets/download").unwrap(),
            Some("dp.st.very-secret".into()),
            Duration::from_secs(1),
        )
        .unwrap();
        let dbg = format!("{:?}", provider);
        assert!(!dbg.contains("very-secret"));
        assert!(dbg.contains("has_token: true"));
    }
}
