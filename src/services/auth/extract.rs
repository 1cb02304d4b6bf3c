use super::request::AuthorizerRequest;

/// Locate the bearer token in a request record. First match wins:
///
/// 1. the first identity-source value, when present and non-empty
/// 2. the `token` query parameter
///
/// Returns `None` when neither location holds a non-empty token.
pub fn extract_token(req: &AuthorizerRequest) -> Option<&str> {
    if let Some(first) = req.identity_source().first()
        && !first.is_empty()
    {
        return Some(first.as_str());
    }

    req.query_param("token").filter(|t| !t.is_empty())
}

// Log-safe view of a token: the first 20 chars (the JWS header prefix).
pub fn token_prefix(token: &str) -> &str {
    match token.char_indices().nth(20) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
