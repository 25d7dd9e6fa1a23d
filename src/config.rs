use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::RetryPolicy;

/// Base URL used when neither the config file nor the environment set one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "FLIPIT_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub retry: RetryConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Per-attempt transport timeout
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_ms: default_timeout_ms(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
  pub max_retries: u32,
  /// Used when a 429 response has no usable Retry-After header
  pub default_retry_delay_ms: u64,
  pub base_delay_ms: u64,
  pub max_delay_ms: u64,
  pub jitter: bool,
}

impl Default for RetryConfig {
  fn default() -> Self {
    let policy = RetryPolicy::default();
    Self {
      max_retries: policy.max_retries,
      default_retry_delay_ms: policy.default_retry_delay.as_millis() as u64,
      base_delay_ms: policy.base_delay.as_millis() as u64,
      max_delay_ms: policy.max_delay.as_millis() as u64,
      jitter: policy.jitter,
    }
  }
}

impl RetryConfig {
  pub fn policy(&self) -> RetryPolicy {
    RetryPolicy {
      max_retries: self.max_retries,
      default_retry_delay: Duration::from_millis(self.default_retry_delay_ms),
      base_delay: Duration::from_millis(self.base_delay_ms),
      max_delay: Duration::from_millis(self.max_delay_ms),
      jitter: self.jitter,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Keep response bodies on disk across runs; otherwise they live in memory
  #[serde(default = "default_true")]
  pub persist: bool,
  /// Database path (default: $XDG_DATA_HOME/flipit/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      persist: true,
      path: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Filter directive used when RUST_LOG is unset
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Write a daily-rolling log file into this directory
  pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      directory: None,
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
  5000
}

fn default_true() -> bool {
  true
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./flipit.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/flipit/config.yaml
  ///
  /// Without a config file the defaults apply. `FLIPIT_API_URL` overrides the
  /// base URL in either case.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    config
      .with_base_url_override(std::env::var(BASE_URL_ENV).ok())
      .validated()
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("flipit.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("flipit").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Replace the base URL when an override is present and non-empty.
  pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
      self.api.base_url = url;
    }
    self
  }

  /// Check the base URL parses and strip a trailing slash so endpoints can be
  /// appended verbatim.
  pub fn validated(mut self) -> Result<Self> {
    url::Url::parse(&self.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL '{}': {}", self.api.base_url, e))?;

    let trimmed = self.api.base_url.trim_end_matches('/').len();
    self.api.base_url.truncate(trimmed);
    Ok(self)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.api.timeout_ms)
  }
}
