//! Pairs the ETag table with the durable response store.

use color_eyre::Result;
use std::sync::Arc;

use super::etag::EtagTable;
use super::storage::{CachedResponse, ResponseStore};

/// Conditional-request cache owned by one client.
///
/// The ETag table lives in memory for the life of the owner; response bodies
/// go to the injected store so they survive restarts. A stored ETag should
/// always have a stored body before the next conditional request, otherwise a
/// 304 has nothing to return.
#[derive(Clone)]
pub struct ConditionalCache {
  etags: EtagTable,
  store: Arc<dyn ResponseStore>,
}

impl ConditionalCache {
  /// Create a cache with an empty ETag table over the given store.
  pub fn new(store: impl ResponseStore + 'static) -> Self {
    Self::with_etags(EtagTable::new(), Arc::new(store))
  }

  pub fn with_etags(etags: EtagTable, store: Arc<dyn ResponseStore>) -> Self {
    Self { etags, store }
  }

  /// Store key for a response body.
  pub fn response_key(url: &str) -> String {
    format!("cache_{}", url)
  }

  /// ETag to send as `If-None-Match` for this URL, if any.
  pub fn etag_for(&self, url: &str) -> Option<String> {
    self.etags.get(url)
  }

  pub fn record_etag(&self, url: &str, etag: &str) {
    self.etags.insert(url, etag);
  }

  /// Persist the serialized `data` payload for a later 304.
  pub fn store_body(&self, url: &str, body: &str) -> Result<()> {
    self.store.put(&Self::response_key(url), body)
  }

  pub fn cached_body(&self, url: &str) -> Result<Option<CachedResponse>> {
    self.store.get(&Self::response_key(url))
  }

  /// Forget both halves of the entry for a URL.
  pub fn invalidate(&self, url: &str) -> Result<()> {
    self.etags.remove(url);
    self.store.remove(&Self::response_key(url))
  }

  /// Drop every ETag and stored body. Returns the number of bodies removed.
  pub fn clear(&self) -> Result<usize> {
    self.etags.clear();
    self.store.clear()
  }

  pub fn etags(&self) -> &EtagTable {
    &self.etags
  }
}
