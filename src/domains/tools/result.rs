//! Invocation results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape every failed invocation takes: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FailureDescriptor {
    pub error: String,
}

/// Outcome of one tool call.
///
/// Serializes to the raw payload on success, or to the failure descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvocationResult {
    Failure(FailureDescriptor),
    Success(Value),
}

impl InvocationResult {
    pub fn success(payload: Value) -> Self {
        Self::Success(payload)
    }

    /// Build a failure; an empty message is replaced so callers always get
    /// something to show.
    pub fn failure(message: impl Into<String>) -> Self {
        let mut error = message.into();
        if error.trim().is_empty() {
            error = "unknown error".to_string();
        }
        Self::Failure(FailureDescriptor { error })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure(f) => Some(&f.error),
            Self::Success(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Success(payload) => payload,
            Self::Failure(f) => serde_json::json!({ "error": f.error }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_shape() {
        let result = InvocationResult::failure("connection refused");
        assert!(result.is_failure());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "error": "connection refused" })
        );
    }

    #[test]
    fn test_empty_failure_message_replaced() {
        let result = InvocationResult::failure("");
        assert_eq!(result.error_message(), Some("unknown error"));
    }

    #[test]
    fn test_success_is_passthrough() {
        let payload = json!({ "id": 1, "name": "repo1" });
        let result = InvocationResult::success(payload.clone());
        assert!(!result.is_failure());
        assert_eq!(serde_json::to_value(&result).unwrap(), payload);
        assert_eq!(result.into_value(), payload);
    }

    #[test]
    fn test_deserialize_distinguishes_failure() {
        let failure: InvocationResult = serde_json::from_value(json!({ "error": "boom" })).unwrap();
        assert!(failure.is_failure());

        let success: InvocationResult =
            serde_json::from_value(json!({ "error": "x", "id": 2 })).unwrap();
        assert!(!success.is_failure());
    }
}
