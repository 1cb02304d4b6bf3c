/*
 * Responsibility
 * - Authorizer response contract ({ isAuthorized, context })
 * - Map a pipeline outcome (claims or AuthError) into that contract
 *
 * Notes
 * - Success context carries forwarded claims only, never token material
 * - Failure context carries a single `error` string, never claims
 */
use std::collections::BTreeMap;

use serde::Serialize;

use super::claims::Claims;
use super::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub is_authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl AuthorizerResponse {
    pub fn error_message(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.get("error"))
            .map(String::as_str)
    }
}

/// How much the renderer attaches to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Forward `client_id`/`scope`/`sub` on allow, `error` on deny.
    WithContext,
    /// `isAuthorized` only, in both directions.
    BooleanOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct DecisionRenderer {
    shape: ResponseShape,
}

impl DecisionRenderer {
    pub fn new(shape: ResponseShape) -> Self {
        Self { shape }
    }

    pub fn render(&self, outcome: Result<Claims, AuthError>) -> AuthorizerResponse {
        match outcome {
            Ok(claims) => self.allow(&claims),
            Err(err) => self.deny(&err),
        }
    }

    pub fn allow(&self, claims: &Claims) -> AuthorizerResponse {
        let context = match self.shape {
            ResponseShape::WithContext => Some(BTreeMap::from([
                ("client_id".to_string(), claims.client_id_or_empty().to_string()),
                ("scope".to_string(), claims.scope_or_empty().to_string()),
                ("sub".to_string(), claims.sub_or_empty().to_string()),
            ])),
            ResponseShape::BooleanOnly => None,
        };

        AuthorizerResponse {
            is_authorized: true,
            context,
        }
    }

    pub fn deny(&self, err: &AuthError) -> AuthorizerResponse {
        let context = match self.shape {
            ResponseShape::WithContext => {
                Some(BTreeMap::from([("error".to_string(), err.to_string())]))
            }
            ResponseShape::BooleanOnly => None,
        };

        AuthorizerResponse {
            is_authorized: false,
            context,
        }
    }
}
