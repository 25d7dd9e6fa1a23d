//! Result types describing where a payload came from.

use chrono::{DateTime, Utc};

/// A payload returned by the client, with metadata about its source.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
  /// The unwrapped `data` payload
  pub data: T,
  /// Where the payload came from
  pub source: CacheSource,
  /// When the payload was stored (only for revalidated responses)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> Fetched<T> {
  /// A payload read from a fresh response body.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// A payload served from the response store after a 304.
  pub fn not_modified(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::NotModified,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Body of a non-304 response
  Network,
  /// Server answered 304; payload read from the response store
  NotModified,
}

impl std::fmt::Display for CacheSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Network => write!(f, "network"),
      Self::NotModified => write!(f, "cache (not modified)"),
    }
  }
}
