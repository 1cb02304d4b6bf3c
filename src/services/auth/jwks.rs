//! Signing-key-set resolution for the asymmetric trust model.
//!
//! Keys are looked up by `kid`. The fetched set is cached process-wide behind
//! a `RwLock`; a miss, an unknown `kid` or a stale set triggers a fetch that
//! runs without holding the cache lock. Fetches are single-flight, and an
//! unknown `kid` only forces a refetch once the current set is older than the
//! refresh cooldown.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};

// Upper bound on the key-set body we are willing to read.
const MAX_JWKS_BYTES: usize = 512 * 1024;

pub const DEFAULT_REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch signing keys from {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("Unable to find a signing key that matches: \"{0}\"")]
    KeyNotFound(String),
    #[error("Invalid signing key for kid \"{kid}\": {reason}")]
    InvalidKey { kid: String, reason: String },
}

struct CachedKeySet {
    keys: HashMap<String, Jwk>,
    fetched_at: Instant,
}

enum Lookup {
    Hit(Jwk),
    // Fresh set without the kid, fetched inside the cooldown window.
    KnownMissing,
    Stale,
}

#[derive(Clone)]
pub struct JwksProvider {
    client: Client,
    jwks_url: String,
    // Zero disables caching: every lookup fetches.
    ttl: Duration,
    refresh_cooldown: Duration,
    cache: Arc<RwLock<Option<CachedKeySet>>>,
    fetch_gate: Arc<Mutex<()>>,
}

impl std::fmt::Debug for JwksProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksProvider")
            .field("jwks_url", &self.jwks_url)
            .field("ttl", &self.ttl)
            .field("refresh_cooldown", &self.refresh_cooldown)
            .finish()
    }
}

impl JwksProvider {
    pub fn new(jwks_url: impl Into<String>, timeout: Duration, ttl: Duration) -> Result<Self, JwksError> {
        let jwks_url = jwks_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| JwksError::Fetch {
                url: jwks_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            jwks_url,
            ttl,
            refresh_cooldown: DEFAULT_REFRESH_COOLDOWN,
            cache: Arc::new(RwLock::new(None)),
            fetch_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Minimum age of the cached set before an unknown `kid` may refetch it.
    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    /// Resolve the decoding key for `kid`, refreshing the key set on a miss.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        match self.lookup(kid).await {
            Lookup::Hit(jwk) => return to_decoding_key(kid, &jwk),
            Lookup::KnownMissing => return Err(JwksError::KeyNotFound(kid.to_string())),
            Lookup::Stale => {}
        }

        let _gate = self.fetch_gate.lock().await;

        // Another caller may have refreshed the set while we waited.
        match self.lookup(kid).await {
            Lookup::Hit(jwk) => return to_decoding_key(kid, &jwk),
            Lookup::KnownMissing => return Err(JwksError::KeyNotFound(kid.to_string())),
            Lookup::Stale => {}
        }

        let keys = self.fetch().await?;
        let jwk = keys.get(kid).cloned();

        if !self.ttl.is_zero() {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedKeySet {
                keys,
                fetched_at: Instant::now(),
            });
        }

        match jwk {
            Some(jwk) => to_decoding_key(kid, &jwk),
            None => Err(JwksError::KeyNotFound(kid.to_string())),
        }
    }

    async fn lookup(&self, kid: &str) -> Lookup {
        if self.ttl.is_zero() {
            return Lookup::Stale;
        }

        let cache = self.cache.read().await;
        let Some(set) = cache.as_ref() else {
            return Lookup::Stale;
        };
        let age = set.fetched_at.elapsed();
        if age >= self.ttl {
            return Lookup::Stale;
        }
        match set.keys.get(kid) {
            Some(jwk) => Lookup::Hit(jwk.clone()),
            None if age < self.refresh_cooldown => Lookup::KnownMissing,
            None => Lookup::Stale,
        }
    }

    async fn fetch(&self) -> Result<HashMap<String, Jwk>, JwksError> {
        tracing::info!(url = %self.jwks_url, "fetching signing key set");

        let fetch_err = |reason: String| JwksError::Fetch {
            url: self.jwks_url.clone(),
            reason,
        };

        let mut resp = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fetch_err(format!("status {}", resp.status())));
        }
        if let Some(len) = resp.content_length()
            && len > MAX_JWKS_BYTES as u64
        {
            return Err(fetch_err(format!("response too large: {} bytes", len)));
        }

        // Content-Length may be absent (chunked), so cap what is actually read.
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| fetch_err(e.to_string()))? {
            if body.len() + chunk.len() > MAX_JWKS_BYTES {
                return Err(fetch_err(format!(
                    "response too large: over {} bytes",
                    MAX_JWKS_BYTES
                )));
            }
            body.extend_from_slice(&chunk);
        }

        let set: JwkSet = serde_json::from_slice(&body).map_err(|e| fetch_err(e.to_string()))?;

        let keys: HashMap<String, Jwk> = set
            .keys
            .into_iter()
            .filter_map(|jwk| jwk.common.key_id.clone().map(|kid| (kid, jwk)))
            .collect();

        tracing::debug!(count = keys.len(), "signing key set fetched");
        Ok(keys)
    }
}

fn to_decoding_key(kid: &str, jwk: &Jwk) -> Result<DecodingKey, JwksError> {
    DecodingKey::from_jwk(jwk).map_err(|e| JwksError::InvalidKey {
        kid: kid.to_string(),
        reason: e.to_string(),
    })
}
