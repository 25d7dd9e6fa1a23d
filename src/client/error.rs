//! Client error types.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::transport::TransportError;

/// Message used when a failing response carries no usable error message.
pub const DEFAULT_API_ERROR_MESSAGE: &str = "API request failed";

/// Errors surfaced by `ApiClient::request`.
#[derive(Debug, Error)]
pub enum ClientError {
  /// Network-level failure, after retries were exhausted.
  #[error(transparent)]
  Transport(#[from] TransportError),

  /// HTTP 429 persisted through every allowed retry.
  #[error("Rate limit exceeded")]
  RateLimited {
    /// Delay the server asked for on the last 429.
    retry_after: Duration,
  },

  /// The server answered with an error envelope or a non-success status.
  #[error(transparent)]
  Api(#[from] ApiError),

  /// A success response whose body is not the expected JSON.
  #[error("failed to decode response from {url}: {source}")]
  Decode {
    url: String,
    #[source]
    source: serde_json::Error,
  },

  /// 304 Not Modified arrived but there is no stored body to serve.
  #[error("server returned 304 Not Modified for {url} but no cached response is stored")]
  NotModifiedWithoutCache { url: String },

  /// The response store failed.
  #[error("response cache error: {0}")]
  Cache(color_eyre::Report),

  /// Input rejected before any request was made.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("request cancelled")]
  Cancelled,

  #[error("request deadline exceeded")]
  DeadlineExceeded,
}

impl ClientError {
  pub fn is_rate_limited(&self) -> bool {
    matches!(self, Self::RateLimited { .. })
  }

  /// Server-requested delay, for rate-limit errors.
  pub fn retry_after(&self) -> Option<Duration> {
    match self {
      Self::RateLimited { retry_after } => Some(*retry_after),
      _ => None,
    }
  }

  /// Errors worth another attempt: transport failures and 429s.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::Transport(_) | Self::RateLimited { .. })
  }
}

/// A failure reported by the API itself.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
  pub status: StatusCode,
  pub message: String,
  /// Machine-readable `type` field, e.g. `VALIDATION_ERROR`
  pub kind: Option<String>,
  pub details: Option<Value>,
}

impl ApiError {
  pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
    Self {
      status,
      message: message.into(),
      kind: None,
      details: None,
    }
  }

  /// Error for a failing response without a readable error body.
  pub fn from_status(status: StatusCode) -> Self {
    Self::new(status, DEFAULT_API_ERROR_MESSAGE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_api_error_displays_server_message() {
    let err: ClientError = ApiError::new(StatusCode::OK, "Wallet and email are required").into();
    assert_eq!(err.to_string(), "Wallet and email are required");
    assert!(!err.is_retryable());
  }

  #[test]
  fn test_rate_limited_is_distinguishable() {
    let err = ClientError::RateLimited {
      retry_after: Duration::from_secs(7),
    };
    assert!(err.is_rate_limited());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert_eq!(err.to_string(), "Rate limit exceeded");

    let other: ClientError = TransportError::Connect("refused".into()).into();
    assert!(!other.is_rate_limited());
    assert!(other.retry_after().is_none());
    assert!(other.is_retryable());
  }
}
