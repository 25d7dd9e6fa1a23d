//! Response store trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A stored response payload.
#[derive(Debug, Clone)]
pub struct CachedResponse {
  /// Serialized JSON of the `data` field
  pub body: String,
  /// When the payload was stored
  pub cached_at: DateTime<Utc>,
}

/// Trait for durable response storage backends.
///
/// Keys are opaque strings; the client uses `"cache_" + url`.
pub trait ResponseStore: Send + Sync {
  /// Get the stored payload for a key.
  fn get(&self, key: &str) -> Result<Option<CachedResponse>>;

  /// Store a payload, replacing any previous value for the key.
  fn put(&self, key: &str, body: &str) -> Result<()>;

  /// Remove a single entry.
  fn remove(&self, key: &str) -> Result<()>;

  /// Remove every entry. Returns the number of entries removed.
  fn clear(&self) -> Result<usize>;
}

/// SQLite-based response storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;
    Self::open_at(&path)
  }

  /// Open (or create) the store at `path`.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private in-memory store. Contents vanish when it is dropped.
  pub fn in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("flipit").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the response cache.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS response_cache (
    cache_key TEXT PRIMARY KEY,
    body TEXT NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl ResponseStore for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(String, String)> = conn
      .query_row(
        "SELECT body, cached_at FROM response_cache WHERE cache_key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cached response: {}", e))?;

    match row {
      Some((body, cached_at_str)) => Ok(Some(CachedResponse {
        body,
        cached_at: parse_datetime(&cached_at_str)?,
      })),
      None => Ok(None),
    }
  }

  fn put(&self, key: &str, body: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO response_cache (cache_key, body, cached_at)
         VALUES (?, ?, datetime('now'))",
        params![key, body],
      )
      .map_err(|e| eyre!("Failed to store cached response: {}", e))?;

    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "DELETE FROM response_cache WHERE cache_key = ?",
        params![key],
      )
      .map_err(|e| eyre!("Failed to remove cached response: {}", e))?;

    Ok(())
  }

  fn clear(&self) -> Result<usize> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let removed = conn
      .execute("DELETE FROM response_cache", [])
      .map_err(|e| eyre!("Failed to clear response cache: {}", e))?;

    Ok(removed)
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
