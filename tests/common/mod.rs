#![allow(dead_code)]

use std::sync::OnceLock;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use request_authorizer::config::{
    AppEnv, CognitoSettings, Config, DEFAULT_DOPPLER_SECRETS_URL, DEFAULT_SECRET_LOOKUP_KEY,
    DEFAULT_SECRET_VALUE, DEFAULT_TRUSTED_ISSUER, SharedSecretSettings, TrustModel,
};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{Value, json};
use url::Url;

pub const KID: &str = "test-kid";
pub const POOL_ID: &str = "us-east-1_JaPwk7OiQ";
pub const CLIENT_ID: &str = "15jo7ld618e5vrb6gfr4dpkok9";
pub const COGNITO_ISSUER: &str = "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_JaPwk7OiQ";
pub const JWKS_PATH: &str = "/us-east-1_JaPwk7OiQ/.well-known/jwks.json";
pub const SECRETS_PATH: &str = "/v3/configs/config/secrets/download";

pub struct RsaTestKey {
    pub encoding: EncodingKey,
    pub jwk: Value,
}

// 2048-bit generation is slow in debug builds; share one key per test binary.
pub fn rsa_key() -> &'static RsaTestKey {
    static KEY: OnceLock<RsaTestKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("generate rsa key");
        let pem = private.to_pkcs8_pem(LineEnding::LF).expect("encode pem");
        let public = private.to_public_key();

        RsaTestKey {
            encoding: EncodingKey::from_rsa_pem(pem.as_bytes()).expect("encoding key"),
            jwk: json!({
                "kty": "RSA",
                "kid": KID,
                "alg": "RS256",
                "use": "sig",
                "n": URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
                "e": URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
            }),
        }
    })
}

pub fn jwks_body() -> Value {
    json!({ "keys": [rsa_key().jwk.clone()] })
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn sign_rs256(kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    jsonwebtoken::encode(&header, claims, &rsa_key().encoding).expect("sign rs256")
}

pub fn sign_hs256(secret: &str, claims: &Value) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign hs256")
}

pub fn cognito_access_claims(exp: i64) -> Value {
    json!({
        "sub": CLIENT_ID,
        "token_use": "access",
        "scope": "default-m2m-resource-server-ylpseo/read",
        "auth_time": exp - 3600,
        "iss": COGNITO_ISSUER,
        "exp": exp,
        "iat": exp - 3600,
        "version": 2,
        "jti": "ac73892a-40e5-4d28-9b28-42fce75b2048",
        "client_id": CLIENT_ID,
    })
}

pub fn shared_secret_claims(iss: &str, exp: i64) -> Value {
    json!({
        "sub": "user-42",
        "token_use": "access",
        "iss": iss,
        "exp": exp,
    })
}

pub fn cognito_settings(jwks_base: &str) -> CognitoSettings {
    let mut settings = CognitoSettings::new("us-east-1", Some(POOL_ID.to_string()));
    settings.expected_audience = Some(CLIENT_ID.to_string());
    settings.jwks_url_override = Some(
        Url::parse(&format!("{}{}", jwks_base, JWKS_PATH)).expect("jwks url"),
    );
    settings.fetch_timeout = Duration::from_secs(2);
    settings
}

pub fn shared_secret_settings(secrets_url: Option<&str>, token: Option<&str>) -> SharedSecretSettings {
    let url = match secrets_url {
        Some(base) => format!("{}{}", base, SECRETS_PATH),
        None => DEFAULT_DOPPLER_SECRETS_URL.to_string(),
    };
    SharedSecretSettings {
        trusted_issuer: DEFAULT_TRUSTED_ISSUER.to_string(),
        secret_lookup_key: DEFAULT_SECRET_LOOKUP_KEY.to_string(),
        secret_default: DEFAULT_SECRET_VALUE.to_string(),
        doppler_token: token.map(str::to_string),
        doppler_secrets_url: Url::parse(&url).expect("secrets url"),
        fetch_timeout: Duration::from_secs(2),
    }
}

pub fn config(trust_model: TrustModel, cognito: CognitoSettings, shared_secret: SharedSecretSettings) -> Config {
    Config {
        addr: "127.0.0.1:0".parse().expect("addr"),
        app_env: AppEnv::Development,
        trust_model,
        cognito,
        shared_secret,
        always_include_context: false,
        http_timeout: Duration::from_secs(10),
        http_body_limit_bytes: 64 * 1024,
    }
}
