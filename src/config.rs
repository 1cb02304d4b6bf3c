/*
 * Responsibility
 * - Load environment variables once at startup (trust model, Cognito pool, shared secret, HTTP limits)
 * - Validate values (malformed => startup fails)
 * - Missing trust settings stay `None` so the authorizer can deny with a configuration error per request
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

pub const DEFAULT_COGNITO_REGION: &str = "us-east-1";
pub const DEFAULT_TRUSTED_ISSUER: &str = "https://kredilatam.com/token-issuer";
pub const DEFAULT_SECRET_LOOKUP_KEY: &str = "JWT_DOPPLER_SECRET";
pub const DEFAULT_SECRET_VALUE: &str = "dev-secret-key";
pub const DEFAULT_DOPPLER_SECRETS_URL: &str =
    "https://api.doppler.com/v3/configs/config/secrets/download";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which trust model the process verifies tokens against.
///
/// Chosen once at startup; every request in the process uses the same model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustModel {
    /// RS256 tokens verified with a public key from the Cognito key set.
    Cognito,
    /// HS256 tokens verified with a shared secret from the secrets provider.
    SharedSecret,
}

impl FromStr for TrustModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cognito" | "asymmetric" | "jwks" => Ok(Self::Cognito),
            "shared_secret" | "shared-secret" | "symmetric" | "hs256" => Ok(Self::SharedSecret),
            _ => Err(ConfigError::Invalid("AUTHORIZER_MODE")),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the asymmetric (Cognito user pool) trust model.
#[derive(Debug, Clone)]
pub struct CognitoSettings {
    pub region: String,
    pub user_pool_id: Option<String>,
    // Required to be present, but access tokens carry no `aud` so it is never validated.
    pub expected_audience: Option<String>,
    pub jwks_url_override: Option<Url>,
    pub jwks_cache_ttl: Duration,
    // An unknown `kid` refetches the key set at most once per this interval.
    pub jwks_refresh_cooldown: Duration,
    pub fetch_timeout: Duration,
    pub leeway_seconds: u64,
}

impl CognitoSettings {
    pub fn new(region: impl Into<String>, user_pool_id: Option<String>) -> Self {
        Self {
            region: region.into(),
            user_pool_id,
            expected_audience: None,
            jwks_url_override: None,
            jwks_cache_ttl: Duration::from_secs(3600),
            jwks_refresh_cooldown: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(5),
            leeway_seconds: 0,
        }
    }

    /// `https://cognito-idp.{region}.amazonaws.com/{pool}`, or `None` when the pool is unset.
    pub fn issuer(&self) -> Option<String> {
        let pool = self.user_pool_id.as_deref().filter(|p| !p.trim().is_empty())?;
        Some(format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, pool
        ))
    }

    pub fn jwks_url(&self) -> Option<String> {
        if let Some(url) = &self.jwks_url_override {
            return Some(url.to_string());
        }
        self.issuer()
            .map(|issuer| format!("{}/.well-known/jwks.json", issuer))
    }

    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.user_pool_id) && present(&self.expected_audience)
    }
}

/// Settings for the symmetric (shared secret) trust model.
#[derive(Debug, Clone)]
pub struct SharedSecretSettings {
    pub trusted_issuer: String,
    pub secret_lookup_key: String,
    pub secret_default: String,
    pub doppler_token: Option<String>,
    pub doppler_secrets_url: Url,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub trust_model: TrustModel,
    pub cognito: CognitoSettings,
    pub shared_secret: SharedSecretSettings,
    // Attach a `context` to every decision regardless of trust model.
    pub always_include_context: bool,

    pub http_timeout: Duration,
    pub http_body_limit_bytes: usize,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_opt(key) {
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn env_url(key: &'static str) -> Result<Option<Url>, ConfigError> {
    env_opt(key)
        .map(|raw| Url::parse(&raw).map_err(|_| ConfigError::Invalid(key)))
        .transpose()
}

fn env_bool(key: &'static str) -> Result<bool, ConfigError> {
    match env_opt(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = env_parse("PORT", 8080)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let trust_model = match env_opt("AUTHORIZER_MODE") {
            Some(raw) => raw.parse::<TrustModel>()?,
            None => TrustModel::Cognito,
        };

        let cognito = CognitoSettings {
            region: env_opt("COGNITO_REGION").unwrap_or_else(|| DEFAULT_COGNITO_REGION.into()),
            user_pool_id: env_opt("USER_POOL_ID"),
            expected_audience: env_opt("EXPECTED_AUDIENCE"),
            jwks_url_override: env_url("COGNITO_JWKS_URL")?,
            jwks_cache_ttl: Duration::from_secs(env_parse("JWKS_CACHE_TTL_SECONDS", 3600)?),
            jwks_refresh_cooldown: Duration::from_secs(env_parse(
                "JWKS_REFRESH_COOLDOWN_SECONDS",
                30,
            )?),
            fetch_timeout: Duration::from_secs(env_parse("JWKS_FETCH_TIMEOUT_SECONDS", 5)?),
            leeway_seconds: env_parse("TOKEN_LEEWAY_SECONDS", 0)?,
        };

        let doppler_secrets_url = match env_url("DOPPLER_SECRETS_URL")? {
            Some(url) => url,
            None => Url::parse(DEFAULT_DOPPLER_SECRETS_URL)
                .map_err(|_| ConfigError::Invalid("DOPPLER_SECRETS_URL"))?,
        };

        let shared_secret = SharedSecretSettings {
            trusted_issuer: env_opt("TRUSTED_ISSUER")
                .unwrap_or_else(|| DEFAULT_TRUSTED_ISSUER.into()),
            secret_lookup_key: env_opt("JWT_SECRET_LOOKUP_KEY")
                .unwrap_or_else(|| DEFAULT_SECRET_LOOKUP_KEY.into()),
            secret_default: env_opt("JWT_SECRET_DEFAULT")
                .unwrap_or_else(|| DEFAULT_SECRET_VALUE.into()),
            doppler_token: env_opt("DOPPLER_TOKEN"),
            doppler_secrets_url,
            fetch_timeout: Duration::from_secs(env_parse("SECRETS_FETCH_TIMEOUT_SECONDS", 5)?),
        };

        let always_include_context = env_bool("AUTHORIZER_ALWAYS_CONTEXT")?;

        let http_timeout = Duration::from_secs(env_parse("HTTP_TIMEOUT_SECONDS", 30)?);
        let http_body_limit_bytes = env_parse("HTTP_BODY_LIMIT_BYTES", 64 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            trust_model,
            cognito,
            shared_secret,
            always_include_context,
            http_timeout,
            http_body_limit_bytes,
        })
    }
}
