//! Failure taxonomy for the authorization pipeline.
//!
//! Every variant is converted into a denial by `DecisionRenderer`; nothing here
//! is ever surfaced as an HTTP error.

use thiserror::Error;

/// Message used for any missing trust configuration. Never carries details.
pub const CONFIGURATION_ERROR_MESSAGE: &str = "Server configuration error";
pub const NO_TOKEN_MESSAGE: &str = "No token provided";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{}", CONFIGURATION_ERROR_MESSAGE)]
    Configuration { missing: &'static str },

    #[error("{}", NO_TOKEN_MESSAGE)]
    TokenAbsent,

    #[error("{0}")]
    KeyResolution(String),

    #[error("{0}")]
    Verification(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    ClaimPolicy(#[from] PolicyViolation),
}

impl AuthError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::TokenAbsent => "token_absent",
            Self::KeyResolution(_) => "key_resolution",
            Self::Verification(_) => "verification",
            Self::ClaimPolicy(_) => "claim_policy",
        }
    }
}

/// A business rule that failed after the signature was verified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("Invalid token_use: {}", .0.as_deref().unwrap_or("None"))]
    InvalidTokenUse(Option<String>),

    #[error("Invalid token_issuer: {}", .0.as_deref().unwrap_or("None"))]
    InvalidIssuer(Option<String>),

    #[error("Token expired")]
    Expired,
}
