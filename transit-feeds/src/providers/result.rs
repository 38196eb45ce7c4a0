//! Provider call outcomes.

use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use super::error::ProviderError;

/// Provider-shaped JSON, passed through without normalisation.
pub type Payload = Arc<Value>;

/// Outcome of one provider call.
///
/// Provider clients never return `Err`; failures of any kind arrive as
/// `Empty` carrying the cause for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult {
    Success(Payload),
    Empty(ProviderError),
}

impl ProviderResult {
    pub fn success(value: Value) -> Self {
        ProviderResult::Success(Arc::new(value))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderResult::Success(_))
    }

    /// The payload, if the call succeeded.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ProviderResult::Success(payload) => Some(payload),
            ProviderResult::Empty(_) => None,
        }
    }

    /// The recorded failure cause, if the call did not succeed.
    pub fn cause(&self) -> Option<&ProviderError> {
        match self {
            ProviderResult::Success(_) => None,
            ProviderResult::Empty(cause) => Some(cause),
        }
    }
}

/// Whether a successful payload actually carries data.
///
/// `null`, `{}`, `[]` and `""` are successes with nothing in them.
pub(crate) fn payload_has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Fold a fallible provider call into a [`ProviderResult`], logging the
/// failure at the client boundary.
pub(crate) fn fold(
    provider: &'static str,
    operation: &'static str,
    resource: &str,
    outcome: Result<Value, ProviderError>,
) -> ProviderResult {
    match outcome {
        Ok(value) => ProviderResult::success(value),
        Err(err) => {
            match &err {
                ProviderError::Malformed {
                    body: Some(body), ..
                } => error!(provider, operation, resource, error = %err, body = %body, "provider call failed"),
                _ => error!(provider, operation, resource, error = %err, "provider call failed"),
            }
            ProviderResult::Empty(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_payloads_carry_no_data() {
        assert!(!payload_has_data(&json!(null)));
        assert!(!payload_has_data(&json!({})));
        assert!(!payload_has_data(&json!([])));
        assert!(!payload_has_data(&json!("")));
        assert!(payload_has_data(&json!({"trainServices": []})));
        assert!(payload_has_data(&json!([{"id": "southeastern"}])));
    }

    #[test]
    fn fold_maps_errors_to_empty() {
        let result = fold("tfl", "line_status", "southeastern", Err(ProviderError::RateLimited));
        assert_eq!(result.cause(), Some(&ProviderError::RateLimited));
        assert!(result.payload().is_none());

        let result = fold("tfl", "line_status", "southeastern", Ok(json!([1])));
        assert!(result.is_success());
        assert_eq!(**result.payload().unwrap(), json!([1]));
    }
}
