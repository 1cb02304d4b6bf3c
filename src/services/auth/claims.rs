use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Claims decoded from a verified token.
///
/// Only the claims the policy engine or the decision renderer read are named;
/// everything else lands in `extra`. Named claims keep their raw JSON value so
/// a signed token with an oddly typed claim still reaches the policy checks
/// instead of failing to decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub token_use: Option<Value>,
    #[serde(default)]
    pub iss: Option<Value>,
    #[serde(default)]
    pub exp: Option<Value>,

    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub client_id: Option<Value>,
    // Space-separated scopes, as issued.
    #[serde(default)]
    pub scope: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn token_use_str(&self) -> Option<&str> {
        self.token_use.as_ref().and_then(Value::as_str)
    }

    pub fn iss_str(&self) -> Option<&str> {
        self.iss.as_ref().and_then(Value::as_str)
    }

    /// `exp` as epoch seconds. Fractional NumericDates are kept as is; any
    /// non-numeric value reads as absent.
    pub fn exp_seconds(&self) -> Option<f64> {
        self.exp.as_ref().and_then(Value::as_f64)
    }

    pub fn sub_or_empty(&self) -> Cow<'_, str> {
        text_or_empty(self.sub.as_ref())
    }

    pub fn client_id_or_empty(&self) -> Cow<'_, str> {
        text_or_empty(self.client_id.as_ref())
    }

    pub fn scope_or_empty(&self) -> Cow<'_, str> {
        text_or_empty(self.scope.as_ref())
    }
}

/// Printable form of a claim for messages: strings verbatim, other values as
/// compact JSON, `None` when absent or null.
pub fn claim_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_or_empty(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}
