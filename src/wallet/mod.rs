//! Wallet profile endpoints built on the resilient client.

mod client;
mod types;
mod validate;

pub use client::WalletApi;
pub use types::{EmailSubmission, FlipitData, UpdateWalletRequest, WalletData};
pub use validate::{is_valid_address, is_valid_email, validate_update};
