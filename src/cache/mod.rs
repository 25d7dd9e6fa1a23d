//! Conditional-request caching for API responses.
//!
//! This module provides the two halves of ETag revalidation:
//! - An in-memory ETag table keyed by absolute URL, owned by one client
//! - A durable response store holding the last payload seen with each ETag
//!
//! `ConditionalCache` pairs them so that a `304 Not Modified` can be answered
//! from the store.

mod etag;
mod layer;
mod storage;
mod traits;

pub use etag::EtagTable;
pub use layer::ConditionalCache;
pub use storage::{CachedResponse, ResponseStore, SqliteStorage};
pub use traits::{CacheSource, Fetched};
