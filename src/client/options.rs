use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use tokio::time::Instant;

use super::cancel::CancelToken;
use super::error::ClientError;

/// Per-call options for `ApiClient::request`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
  pub method: Method,
  /// Merged over the client's default headers; these win on conflict.
  pub headers: HeaderMap,
  pub body: Option<Vec<u8>>,
  /// Skip `If-None-Match` and every ETag/body cache read and write.
  pub skip_cache: bool,
  /// Overrides the client's configured retry budget.
  pub max_retries: Option<u32>,
  pub cancel: Option<CancelToken>,
  /// Absolute deadline covering every attempt and backoff.
  pub deadline: Option<Instant>,
}

impl RequestOptions {
  pub fn get() -> Self {
    Self::default()
  }

  /// POST with a JSON-serialized body.
  pub fn post_json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ClientError> {
    let body = serde_json::to_vec(body)
      .map_err(|e| ClientError::Validation(format!("request body is not serializable: {}", e)))?;

    let mut options = Self {
      method: Method::POST,
      body: Some(body),
      ..Self::default()
    };
    options
      .headers
      .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(options)
  }

  pub fn method(mut self, method: Method) -> Self {
    self.method = method;
    self
  }

  pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
    self.headers.insert(name, value);
    self
  }

  pub fn skip_cache(mut self) -> Self {
    self.skip_cache = true;
    self
  }

  pub fn max_retries(mut self, max_retries: u32) -> Self {
    self.max_retries = Some(max_retries);
    self
  }

  pub fn cancel_on(mut self, token: CancelToken) -> Self {
    self.cancel = Some(token);
    self
  }

  pub fn deadline(mut self, deadline: Instant) -> Self {
    self.deadline = Some(deadline);
    self
  }
}
