//! Client library for the Flipit ad-credit claim API.

pub mod cache;
pub mod client;
pub mod config;
pub mod logging;
pub mod wallet;

pub use client::{ApiClient, ClientError, RequestOptions};
pub use config::Config;
pub use wallet::WalletApi;
