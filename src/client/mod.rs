//! Resilient HTTP client for the Flipit JSON API.
//!
//! Requests go through [`ApiClient`], which layers three behaviours over a
//! plain [`Transport`]:
//! - ETag revalidation: `If-None-Match` on repeat requests, 304s answered
//!   from the durable response store
//! - 429 handling: sleep for the server's `Retry-After`, then retry
//! - Transport failures: exponential backoff (1s, 2s, 4s, ...)
//!
//! Both kinds of retry draw from one per-call budget (`max_retries`).

mod api;
mod cancel;
mod envelope;
mod error;
mod options;
mod rate_limit;
mod retry;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use api::ApiClient;
pub use cancel::CancelToken;
pub use envelope::{Envelope, ErrorBody};
pub use error::{ApiError, ClientError, DEFAULT_API_ERROR_MESSAGE};
pub use options::RequestOptions;
pub use rate_limit::{RateLimitStatus, RateLimitTracker};
pub use retry::RetryPolicy;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
