//! HTTP transport seam and the reqwest implementation.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// A fully resolved request handed to a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
  pub method: Method,
  pub url: String,
  pub headers: HeaderMap,
  pub body: Option<Vec<u8>>,
}

/// A response as seen by the client. A 304 carries an empty body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: StatusCode,
  pub headers: HeaderMap,
  pub body: Vec<u8>,
}

impl HttpResponse {
  pub fn new(status: StatusCode) -> Self {
    Self {
      status,
      headers: HeaderMap::new(),
      body: Vec::new(),
    }
  }

  /// Response with a JSON body.
  pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
    Self::new(status).with_body(body.to_string().into_bytes())
  }

  pub fn with_body(mut self, body: Vec<u8>) -> Self {
    self.body = body;
    self
  }

  /// Add a header. Invalid names or values are ignored.
  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    if let (Ok(name), Ok(value)) = (
      HeaderName::from_bytes(name.as_bytes()),
      HeaderValue::from_str(value),
    ) {
      self.headers.append(name, value);
    }
    self
  }

  /// Header value as text, if present and valid UTF-8.
  pub fn header(&self, name: impl reqwest::header::AsHeaderName) -> Option<&str> {
    self.headers.get(name).and_then(|v| v.to_str().ok())
  }
}

/// Failure to obtain any HTTP response at all.
#[derive(Debug, Error)]
pub enum TransportError {
  #[error("request timed out after {0:?}")]
  Timeout(Duration),

  #[error("connection failed: {0}")]
  Connect(String),

  #[error("transport error: {0}")]
  Http(#[from] reqwest::Error),
}

/// Sends one HTTP request and returns whatever the server answered.
///
/// Implementations must not interpret status codes; retry, caching and
/// envelope handling belong to the client.
pub trait Transport: Send + Sync {
  fn send(
    &self,
    request: HttpRequest,
  ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Production transport backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
  client: reqwest::Client,
  timeout: Duration,
}

impl ReqwestTransport {
  /// Create a transport whose every attempt is bounded by `timeout`.
  pub fn new(timeout: Duration) -> color_eyre::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("flipit-client/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, timeout })
  }

  fn classify(&self, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
      TransportError::Timeout(self.timeout)
    } else if e.is_connect() {
      TransportError::Connect(e.to_string())
    } else {
      TransportError::Http(e)
    }
  }
}

impl Transport for ReqwestTransport {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = self
      .client
      .request(request.method, &request.url)
      .headers(request.headers);

    if let Some(body) = request.body {
      builder = builder.body(body);
    }

    let response = builder.send().await.map_err(|e| self.classify(e))?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await.map_err(|e| self.classify(e))?;

    Ok(HttpResponse {
      status,
      headers,
      body: body.to_vec(),
    })
  }
}
