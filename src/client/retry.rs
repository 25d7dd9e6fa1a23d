//! Retry timing: Retry-After parsing and exponential backoff.

use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Timing rules shared by every request of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Additional attempts after the first failure.
  pub max_retries: u32,
  /// Delay after a 429 without a usable Retry-After header.
  pub default_retry_delay: Duration,
  /// Backoff after the first transport failure; doubles per attempt.
  pub base_delay: Duration,
  /// Upper bound for transport backoff.
  pub max_delay: Duration,
  /// Add 0-10% random jitter to transport backoff.
  pub jitter: bool,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries: 3,
      default_retry_delay: Duration::from_millis(1000),
      base_delay: Duration::from_millis(1000),
      max_delay: Duration::from_secs(30),
      jitter: false,
    }
  }
}

impl RetryPolicy {
  /// Backoff before retrying after a transport failure on `attempt` (0-indexed):
  /// 1s, 2s, 4s, ... with the default base.
  pub fn backoff_delay(&self, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);

    if !self.jitter {
      return delay;
    }

    let jitter_range = delay.as_millis() as u64 / 10;
    let jitter = if jitter_range > 0 {
      rand::thread_rng().gen_range(0..jitter_range)
    } else {
      0
    };
    delay + Duration::from_millis(jitter)
  }

  /// Delay requested by a 429 response. `Retry-After` is whole seconds.
  pub fn retry_after(&self, headers: &HeaderMap) -> Duration {
    headers
      .get(RETRY_AFTER)
      .and_then(|v| v.to_str().ok())
      .and_then(|s| s.trim().parse::<u64>().ok())
      .map(Duration::from_secs)
      .unwrap_or(self.default_retry_delay)
  }
}
