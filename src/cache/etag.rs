use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory table of the latest ETag seen per absolute URL.
///
/// Created empty with its client and dropped with it. Clones share the same
/// table, so a cloned client revalidates against the same entries.
#[derive(Debug, Clone, Default)]
pub struct EtagTable {
  inner: Arc<Mutex<HashMap<String, String>>>,
}

impl EtagTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, url: &str) -> Option<String> {
    self.lock().get(url).cloned()
  }

  /// Store `etag` for `url`, replacing any previous value.
  pub fn insert(&self, url: &str, etag: &str) {
    self.lock().insert(url.to_string(), etag.to_string());
  }

  pub fn remove(&self, url: &str) -> Option<String> {
    self.lock().remove(url)
  }

  pub fn clear(&self) {
    self.lock().clear();
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  // A panic while holding the lock cannot leave a half-written String pair,
  // so a poisoned table is still usable.
  fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }
}
