//! The `{ "data": ... } | { "error": { ... } }` response envelope.

use reqwest::StatusCode;
use serde_json::Value;

use super::error::{ApiError, DEFAULT_API_ERROR_MESSAGE};

/// A decoded response envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
  /// The `data` field, `Null` when absent
  pub data: Value,
  /// The `error` field, when present and not null/false/empty
  pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
  pub message: Option<String>,
  pub kind: Option<String>,
  pub details: Option<Value>,
}

impl Envelope {
  /// Decode a response body. An empty body is an envelope with no data.
  pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self::default());
    }

    let value: Value = serde_json::from_slice(body)?;
    Ok(Self::from_value(value))
  }

  pub fn from_value(value: Value) -> Self {
    let Value::Object(mut map) = value else {
      return Self::default();
    };

    let data = map.remove("data").unwrap_or(Value::Null);
    let error = map.remove("error").and_then(ErrorBody::from_value);

    Self { data, error }
  }
}

impl ErrorBody {
  fn from_value(value: Value) -> Option<Self> {
    match value {
      Value::Null | Value::Bool(false) => None,
      Value::String(s) if s.is_empty() => None,
      // Some backend routes send `{ "error": "message" }`
      Value::String(s) => Some(Self {
        message: Some(s),
        ..Self::default()
      }),
      Value::Object(mut map) => Some(Self {
        message: map
          .remove("message")
          .and_then(|m| m.as_str().map(String::from)),
        kind: map.remove("type").and_then(|t| t.as_str().map(String::from)),
        details: map.remove("details"),
      }),
      _ => Some(Self::default()),
    }
  }

  pub fn into_api_error(self, status: StatusCode) -> ApiError {
    ApiError {
      status,
      message: self
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_API_ERROR_MESSAGE.to_string()),
      kind: self.kind,
      details: self.details,
    }
  }
}
