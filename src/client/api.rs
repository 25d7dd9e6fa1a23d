//! The resilient JSON API client.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use chrono::Utc;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::cache::{ConditionalCache, Fetched, SqliteStorage};
use crate::config::Config;

use super::cancel::CancelToken;
use super::envelope::Envelope;
use super::error::{ApiError, ClientError};
use super::options::RequestOptions;
use super::rate_limit::{RateLimitStatus, RateLimitTracker};
use super::retry::RetryPolicy;
use super::transport::{HttpRequest, ReqwestTransport, Transport};

/// JSON API client with ETag revalidation and rate-limit aware retries.
///
/// Every call to [`ApiClient::request`] is one logical operation: 429s and
/// transport failures are retried internally, sharing one attempt budget, and
/// only the final outcome reaches the caller. Clones share the transport, the
/// ETag table, the response store and the rate-limit tracker.
pub struct ApiClient<T = ReqwestTransport> {
  base_url: String,
  transport: Arc<T>,
  cache: ConditionalCache,
  policy: RetryPolicy,
  rate_limit: RateLimitTracker,
}

impl<T> Clone for ApiClient<T> {
  fn clone(&self) -> Self {
    Self {
      base_url: self.base_url.clone(),
      transport: Arc::clone(&self.transport),
      cache: self.cache.clone(),
      policy: self.policy.clone(),
      rate_limit: self.rate_limit.clone(),
    }
  }
}

impl ApiClient<ReqwestTransport> {
  /// Build a client from configuration, opening the response store.
  pub fn from_config(config: &Config) -> color_eyre::Result<Self> {
    let transport = ReqwestTransport::new(config.request_timeout())?;

    let storage = if config.cache.persist {
      match &config.cache.path {
        Some(path) => SqliteStorage::open_at(path)?,
        None => SqliteStorage::open()?,
      }
    } else {
      SqliteStorage::in_memory()?
    };

    Ok(Self::new(
      config.api.base_url.clone(),
      transport,
      ConditionalCache::new(storage),
      config.retry.policy(),
    ))
  }
}

impl<T: Transport> ApiClient<T> {
  pub fn new(
    base_url: impl Into<String>,
    transport: T,
    cache: ConditionalCache,
    policy: RetryPolicy,
  ) -> Self {
    Self {
      base_url: base_url.into(),
      transport: Arc::new(transport),
      cache,
      policy,
      rate_limit: RateLimitTracker::default(),
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn cache(&self) -> &ConditionalCache {
    &self.cache
  }

  pub fn policy(&self) -> &RetryPolicy {
    &self.policy
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  /// Last rate-limit budget advertised by the server.
  pub fn rate_limit_status(&self) -> RateLimitStatus {
    self.rate_limit.status()
  }

  /// Absolute URL for an endpoint. The endpoint is appended verbatim.
  pub fn url_for(&self, endpoint: &str) -> String {
    format!("{}{}", self.base_url, endpoint)
  }

  /// Perform a request and return the unwrapped `data` payload.
  pub async fn request<R: DeserializeOwned>(
    &self,
    endpoint: &str,
    options: RequestOptions,
  ) -> Result<R, ClientError> {
    Ok(self.request_with_source(endpoint, options).await?.data)
  }

  /// Like [`ApiClient::request`], also reporting whether the payload came
  /// from the network or from the store after a 304.
  pub async fn request_with_source<R: DeserializeOwned>(
    &self,
    endpoint: &str,
    options: RequestOptions,
  ) -> Result<Fetched<R>, ClientError> {
    let url = self.url_for(endpoint);

    let fetched = match options.deadline {
      Some(deadline) => tokio::time::timeout_at(deadline, self.run(&url, &options))
        .await
        .map_err(|_| {
          warn!(url = %url, "request deadline exceeded");
          ClientError::DeadlineExceeded
        })??,
      None => self.run(&url, &options).await?,
    };

    let source = fetched.source;
    let cached_at = fetched.cached_at;
    let data = serde_json::from_value(fetched.data).map_err(|source| ClientError::Decode {
      url: url.clone(),
      source,
    })?;

    Ok(Fetched {
      data,
      source,
      cached_at,
    })
  }

  /// Bounded attempt loop. 429s sleep for the server's Retry-After, transport
  /// failures for an exponential backoff; everything else returns at once.
  ///
  /// A spent `ratelimit-remaining` budget with a reset still ahead fails the
  /// call before anything is sent.
  async fn run(&self, url: &str, options: &RequestOptions) -> Result<Fetched<Value>, ClientError> {
    let max_retries = options.max_retries.unwrap_or(self.policy.max_retries);
    let cancel = options.cancel.as_ref();
    let mut attempt: u32 = 0;

    if let Some(retry_after) = self.rate_limit.status().blocked_for(Utc::now()) {
      warn!(
        url = %url,
        retry_after_ms = retry_after.as_millis() as u64,
        "rate-limit budget spent, not sending request"
      );
      return Err(ClientError::RateLimited { retry_after });
    }

    loop {
      if cancel.is_some_and(CancelToken::is_cancelled) {
        return Err(ClientError::Cancelled);
      }

      let err = match until_cancelled(cancel, self.send_once(url, options)).await? {
        Ok(fetched) => return Ok(fetched),
        Err(err) => err,
      };

      if !err.is_retryable() {
        error!(url = %url, attempt, error = %err, "API request failed");
        return Err(err);
      }

      let delay = match &err {
        ClientError::RateLimited { retry_after } => *retry_after,
        _ => self.policy.backoff_delay(attempt),
      };

      if attempt >= max_retries {
        error!(url = %url, attempt, error = %err, "giving up after {} retries", max_retries);
        return Err(err);
      }

      warn!(
        url = %url,
        attempt,
        delay_ms = delay.as_millis() as u64,
        error = %err,
        "retrying request"
      );
      until_cancelled(cancel, tokio::time::sleep(delay)).await?;
      attempt += 1;
    }
  }

  /// One transport round trip with conditional caching applied.
  async fn send_once(&self, url: &str, options: &RequestOptions) -> Result<Fetched<Value>, ClientError> {
    let use_cache = !options.skip_cache;
    let mut headers = merge_headers(&options.headers);

    if use_cache {
      if let Some(etag) = self.cache.etag_for(url) {
        match HeaderValue::from_str(&etag) {
          Ok(value) => {
            headers.insert(IF_NONE_MATCH, value);
          }
          Err(_) => warn!(url = %url, etag = %etag, "ignoring unusable cached ETag"),
        }
      }
    }

    debug!(method = %options.method, url = %url, "sending request");
    let response = self
      .transport
      .send(HttpRequest {
        method: options.method.clone(),
        url: url.to_string(),
        headers,
        body: options.body.clone(),
      })
      .await?;

    let status = response.status;
    self.rate_limit.observe(&response.headers);

    if status == StatusCode::TOO_MANY_REQUESTS {
      let retry_after = self.policy.retry_after(&response.headers);
      return Err(ClientError::RateLimited { retry_after });
    }

    if status == StatusCode::NOT_MODIFIED {
      return self.serve_not_modified(url, use_cache);
    }

    // Recorded for every status. An error response stores no body, so a later
    // 304 for this URL ends in `NotModifiedWithoutCache`.
    let etag = response.header(ETAG).map(String::from);
    if use_cache {
      if let Some(etag) = &etag {
        self.cache.record_etag(url, etag);
      }
    }

    let envelope = match Envelope::parse(&response.body) {
      Ok(envelope) => envelope,
      Err(_) if !status.is_success() => {
        return Err(ApiError::from_status(status).into());
      }
      Err(source) => {
        return Err(ClientError::Decode {
          url: url.to_string(),
          source,
        })
      }
    };

    if !status.is_success() {
      let error = envelope
        .error
        .map(|e| e.into_api_error(status))
        .unwrap_or_else(|| ApiError::from_status(status));
      return Err(error.into());
    }

    if let Some(error) = envelope.error {
      return Err(error.into_api_error(status).into());
    }

    if use_cache && etag.is_some() {
      self.persist_body(url, &envelope.data);
    }

    debug!(url = %url, status = status.as_u16(), "request succeeded");
    Ok(Fetched::from_network(envelope.data))
  }

  fn serve_not_modified(&self, url: &str, use_cache: bool) -> Result<Fetched<Value>, ClientError> {
    let cached = if use_cache {
      self.cache.cached_body(url).map_err(ClientError::Cache)?
    } else {
      None
    };

    let Some(cached) = cached else {
      warn!(url = %url, "304 Not Modified without a stored response");
      return Err(ClientError::NotModifiedWithoutCache {
        url: url.to_string(),
      });
    };

    let data = serde_json::from_str(&cached.body).map_err(|source| ClientError::Decode {
      url: url.to_string(),
      source,
    })?;

    debug!(url = %url, "served from cache after 304");
    Ok(Fetched::not_modified(data, cached.cached_at))
  }

  /// Store the payload for a later 304. On failure the ETag is dropped too, so
  /// the next request is unconditional instead of hitting an empty cache.
  fn persist_body(&self, url: &str, data: &Value) {
    let stored = serde_json::to_string(data)
      .map_err(color_eyre::Report::from)
      .and_then(|body| self.cache.store_body(url, &body));

    if let Err(e) = stored {
      warn!(url = %url, error = %e, "failed to cache response body");
      self.cache.etags().remove(url);
    }
  }
}

/// Default JSON headers overlaid with the caller's; caller values win.
fn merge_headers(caller: &HeaderMap) -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
  headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

  for name in caller.keys() {
    headers.remove(name);
  }
  headers.extend(caller.clone());
  headers
}

/// Race `fut` against cancellation of `cancel`.
async fn until_cancelled<F: Future>(
  cancel: Option<&CancelToken>,
  fut: F,
) -> Result<F::Output, ClientError> {
  match cancel {
    Some(token) => tokio::select! {
      biased;
      _ = token.cancelled() => Err(ClientError::Cancelled),
      out = fut => Ok(out),
    },
    None => Ok(fut.await),
  }
}
