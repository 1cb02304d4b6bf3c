/*
 * Responsibility
 * - Normalized view of an inbound authorizer event (Request Record)
 * - Accepts API Gateway REQUEST (v1) and HTTP API (v2) payloads; unknown fields are ignored
 */
use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    // v2 payloads put the configured identity source values here (ordered).
    #[serde(default)]
    pub identity_source: Option<Vec<String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

impl AuthorizerRequest {
    pub fn identity_source(&self) -> &[String] {
        self.identity_source.as_deref().unwrap_or_default()
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|q| q.get(name))
            .map(String::as_str)
    }

    /// Header names only, for diagnostics. Values may carry credentials.
    pub fn header_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .headers
            .as_ref()
            .map(|h| h.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    pub fn with_identity_source(mut self, values: Vec<String>) -> Self {
        self.identity_source = Some(values);
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_http_api_v2_event() {
        let event = serde_json::json!({
            "version": "2.0",
            "type": "REQUEST",
            "routeArn": "arn:aws:execute-api:us-east-1:123456789012:abcdef123/test/GET/request",
            "identitySource": ["eyJ.a.b"],
            "queryStringParameters": {"token": "eyJ.a.b"},
            "requestContext": {"http": {"method": "GET"}}
        });

        let req: AuthorizerRequest = serde_json::from_value(event).unwrap();
        assert_eq!(req.identity_source(), ["eyJ.a.b".to_string()]);
        assert_eq!(req.query_param("token"), Some("eyJ.a.b"));
        assert!(req.headers.is_none());
    }

    #[test]
    fn deserializes_v1_event_with_nulls() {
        let event = serde_json::json!({
            "httpMethod": "POST",
            "path": "/token",
            "headers": {"Content-Type": "application/json", "Accept": "*/*"},
            "body": "",
            "identitySource": null,
            "pathParameters": null,
            "queryStringParameters": null
        });

        let req: AuthorizerRequest = serde_json::from_value(event).unwrap();
        assert!(req.identity_source().is_empty());
        assert_eq!(req.query_param("token"), None);
        assert_eq!(req.header_names(), vec!["Accept", "Content-Type"]);
    }

    #[test]
    fn builders_compose() {
        let req = AuthorizerRequest::default()
            .with_identity_source(vec!["a".into()])
            .with_query_param("token", "b");
        assert_eq!(req.identity_source(), ["a".to_string()]);
        assert_eq!(req.query_param("token"), Some("b"));
    }
}
