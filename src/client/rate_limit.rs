//! Tracking of the server's advertised rate-limit budget.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Budget assumed before the server has reported one.
pub const DEFAULT_REMAINING: u64 = 1000;

const REMAINING_HEADER: &str = "ratelimit-remaining";
const RESET_HEADER: &str = "ratelimit-reset";

/// Last rate-limit budget reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
  /// Requests left in the current window
  pub remaining: u64,
  /// When the window resets, if the server said
  pub reset_at: Option<DateTime<Utc>>,
}

impl Default for RateLimitStatus {
  fn default() -> Self {
    Self {
      remaining: DEFAULT_REMAINING,
      reset_at: None,
    }
  }
}

impl RateLimitStatus {
  pub fn can_make_request(&self) -> bool {
    self.remaining > 0
  }

  /// Time left until the window resets, when the budget is spent and the
  /// reset is still ahead of `now`.
  pub fn blocked_for(&self, now: DateTime<Utc>) -> Option<Duration> {
    if self.can_make_request() {
      return None;
    }
    self
      .reset_at
      .and_then(|reset_at| (reset_at - now).to_std().ok())
      .filter(|wait| !wait.is_zero())
  }
}

/// Shared tracker updated from every response's `ratelimit-*` headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimitTracker {
  status: Arc<Mutex<RateLimitStatus>>,
}

impl RateLimitTracker {
  /// Update from response headers. Absent or unparseable headers leave the
  /// corresponding field unchanged.
  pub fn observe(&self, headers: &HeaderMap) {
    let remaining = header_u64(headers, REMAINING_HEADER);
    let reset_secs = header_u64(headers, RESET_HEADER);
    if remaining.is_none() && reset_secs.is_none() {
      return;
    }

    let mut status = self.status.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(remaining) = remaining {
      status.remaining = remaining;
    }
    if let Some(secs) = reset_secs {
      let secs = secs.min(i32::MAX as u64) as i64;
      status.reset_at = Some(Utc::now() + chrono::Duration::seconds(secs));
    }
  }

  pub fn status(&self) -> RateLimitStatus {
    *self.status.lock().unwrap_or_else(|e| e.into_inner())
  }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .and_then(|s| s.trim().parse().ok())
}
