use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::MessageId;
use crate::error::RelayError;

/// Error payload carried back to the external peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Outbound envelope correlated to a [`super::RelayMessage`] by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Failure { id: MessageId, error: ErrorBody },
    Success { id: MessageId, response: Value },
}

impl RelayResponse {
    /// Encode a handler outcome into its wire shape
    ///
    /// Only the error's display text crosses the boundary.
    pub fn from_outcome(id: MessageId, outcome: Result<Value, RelayError>) -> Self {
        match outcome {
            Ok(response) => Self::Success { id, response },
            Err(e) => Self::Failure {
                id,
                error: ErrorBody {
                    message: e.to_string(),
                },
            },
        }
    }

    /// Correlation id of this response
    pub fn id(&self) -> &MessageId {
        match self {
            Self::Success { id, .. } | Self::Failure { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Extract the failure a settled result reports through its `error` field
///
/// Returns `None` unless `result.error` is truthy. An object error yields
/// its `message`, a string error yields itself, anything else its JSON text.
pub fn reported_error(result: &Value) -> Option<String> {
    let error = result.get("error").filter(|e| is_truthy(e))?;

    let message = match error {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => error.to_string(),
        },
        other => other.to_string(),
    };

    Some(message)
}
