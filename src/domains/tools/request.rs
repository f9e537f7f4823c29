//! Invocation requests handed to tool handlers.

use std::fmt;

use serde_json::{Map, Value};

use super::error::ExternalCallError;

/// Opaque credential injected by the host.
///
/// The value is only reachable through [`AuthToken::expose`]; `Debug` is
/// redacted so a token never ends up in a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Parameters for one tool call plus the injected token.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    params: Map<String, Value>,
    auth_token: AuthToken,
}

impl InvocationRequest {
    pub fn new(params: Map<String, Value>, auth_token: AuthToken) -> Self {
        Self { params, auth_token }
    }

    pub fn auth_token(&self) -> &AuthToken {
        &self.auth_token
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Parameter value; JSON `null` counts as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Parameter value as-is for forwarding into a request body.
    pub fn value(&self, name: &str) -> Value {
        self.get(name).cloned().unwrap_or(Value::Null)
    }

    /// Required string parameter.
    pub fn str(&self, name: &str) -> Result<&str, ExternalCallError> {
        match self.get(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ExternalCallError::invalid_parameter(
                name,
                format!("expected a string, got {}", other),
            )),
            None => Err(ExternalCallError::invalid_parameter(name, "missing")),
        }
    }

    /// Required parameter used as URL path text. Strings and numbers only.
    pub fn path_segment(&self, name: &str) -> Result<String, ExternalCallError> {
        match self.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(ExternalCallError::invalid_parameter(
                name,
                format!("expected a string or number, got {}", other),
            )),
            None => Err(ExternalCallError::invalid_parameter(name, "missing")),
        }
    }

    /// Optional string parameter with a default.
    pub fn str_or(&self, name: &str, default: &str) -> Result<String, ExternalCallError> {
        if self.contains(name) {
            self.str(name).map(str::to_string)
        } else {
            Ok(default.to_string())
        }
    }

    /// Optional non-negative integer with a default.
    ///
    /// Accepts JSON integers, non-negative floats (truncated) and numeric
    /// strings.
    pub fn u64_or(&self, name: &str, default: u64) -> Result<u64, ExternalCallError> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };

        let parsed = match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };

        parsed.ok_or_else(|| {
            ExternalCallError::invalid_parameter(
                name,
                format!("expected a non-negative integer, got {}", value),
            )
        })
    }

    /// Optional list of strings. A single string is treated as a list of one.
    pub fn string_list(&self, name: &str) -> Result<Option<Vec<String>>, ExternalCallError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ExternalCallError::invalid_parameter(
                            name,
                            format!("expected a list of strings, found {}", item),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(ExternalCallError::invalid_parameter(
                name,
                format!("expected a list of strings, got {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(params: Value) -> InvocationRequest {
        let Value::Object(map) = params else {
            panic!("params must be an object");
        };
        InvocationRequest::new(map, AuthToken::new("secret-token"))
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let req = request(json!({ "query": "rust" }));
        let debug_str = format!("{:?}", req);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("secret-token"));
        assert_eq!(req.auth_token().expose(), "secret-token");
    }

    #[test]
    fn test_null_counts_as_absent() {
        let req = request(json!({ "instructions": null }));
        assert!(!req.contains("instructions"));
        assert_eq!(req.value("instructions"), Value::Null);
    }

    #[test]
    fn test_str_accessors() {
        let req = request(json!({ "username": "octocat", "count": 3 }));
        assert_eq!(req.str("username").unwrap(), "octocat");
        assert!(req.str("count").is_err());
        assert!(req.str("missing").is_err());
        assert_eq!(req.str_or("topic", "general").unwrap(), "general");
    }

    #[test]
    fn test_path_segment_accepts_numbers() {
        let req = request(json!({ "repo_id": 123, "username": "octocat", "flag": true }));
        assert_eq!(req.path_segment("repo_id").unwrap(), "123");
        assert_eq!(req.path_segment("username").unwrap(), "octocat");
        assert!(req.path_segment("flag").is_err());
        assert!(req.path_segment("missing").is_err());
    }

    #[test]
    fn test_u64_or_coercion() {
        let req = request(json!({
            "a": 5,
            "b": "7",
            "c": 2.9,
            "d": "many",
            "e": -1
        }));
        assert_eq!(req.u64_or("a", 1).unwrap(), 5);
        assert_eq!(req.u64_or("b", 1).unwrap(), 7);
        assert_eq!(req.u64_or("c", 1).unwrap(), 2);
        assert_eq!(req.u64_or("missing", 50).unwrap(), 50);
        assert!(req.u64_or("d", 1).is_err());
        assert!(req.u64_or("e", 1).is_err());
    }

    #[test]
    fn test_string_list() {
        let req = request(json!({
            "urls": ["a.com", "b.com"],
            "single": "c.com",
            "mixed": ["a.com", 1]
        }));
        assert_eq!(
            req.string_list("urls").unwrap(),
            Some(vec!["a.com".to_string(), "b.com".to_string()])
        );
        assert_eq!(
            req.string_list("single").unwrap(),
            Some(vec!["c.com".to_string()])
        );
        assert_eq!(req.string_list("missing").unwrap(), None);
        assert!(req.string_list("mixed").is_err());
    }
}
