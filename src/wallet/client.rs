use serde_json::Value;
use tracing::info;

use crate::client::{ApiClient, ClientError, ReqwestTransport, RequestOptions, Transport};

use super::types::{EmailSubmission, UpdateWalletRequest, WalletData};
use super::validate::{is_valid_address, is_valid_email, validate_update};

/// Typed wallet endpoints of the Flipit API
pub struct WalletApi<T = ReqwestTransport> {
  client: ApiClient<T>,
}

impl<T> Clone for WalletApi<T> {
  fn clone(&self) -> Self {
    Self {
      client: self.client.clone(),
    }
  }
}

impl<T: Transport> WalletApi<T> {
  pub fn new(client: ApiClient<T>) -> Self {
    Self { client }
  }

  pub fn client(&self) -> &ApiClient<T> {
    &self.client
  }

  /// Get profile and node counts for a wallet
  pub async fn get_wallet_details(&self, address: &str) -> Result<WalletData, ClientError> {
    check_address(address)?;
    self
      .client
      .request(&format!("/wallet/{}", address), RequestOptions::get())
      .await
  }

  /// Create or update the profile for a wallet
  pub async fn update_wallet_details(
    &self,
    request: &UpdateWalletRequest,
  ) -> Result<WalletData, ClientError> {
    validate_update(request).map_err(|errors| ClientError::Validation(errors.join("; ")))?;

    info!(address = %request.address, "updating wallet details");
    let options = RequestOptions::post_json(request)?.skip_cache();
    self.client.request("/wallet/update", options).await
  }

  /// Get node ownership history for a wallet
  pub async fn get_wallet_transactions(&self, address: &str) -> Result<WalletData, ClientError> {
    check_address(address)?;
    self
      .client
      .request(
        &format!("/wallet/{}/transactions", address),
        RequestOptions::get(),
      )
      .await
  }

  /// Register a contact email for a wallet (never cached)
  pub async fn submit_email(&self, email: &str, address: &str) -> Result<(), ClientError> {
    if !is_valid_email(email) {
      return Err(ClientError::Validation("Invalid email format".to_string()));
    }
    check_address(address)?;

    info!(address = %address, "submitting email");
    let options = RequestOptions::post_json(&EmailSubmission { email, address })?.skip_cache();
    let _: Value = self.client.request("/email-submit", options).await?;
    Ok(())
  }
}

fn check_address(address: &str) -> Result<(), ClientError> {
  if address.is_empty() {
    return Err(ClientError::Validation("Wallet address is required".to_string()));
  }
  if !is_valid_address(address) {
    return Err(ClientError::Validation(format!("Invalid wallet address: {}", address)));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{ConditionalCache, SqliteStorage};
  use crate::client::mock::ScriptedTransport;
  use crate::client::{HttpResponse, RetryPolicy};
  use reqwest::header::IF_NONE_MATCH;
  use reqwest::{Method, StatusCode};
  use serde_json::json;

  const ADDRESS: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

  fn wallet_api(transport: ScriptedTransport) -> WalletApi<ScriptedTransport> {
    WalletApi::new(ApiClient::new(
      "http://localhost:4000",
      transport,
      ConditionalCache::new(SqliteStorage::in_memory().unwrap()),
      RetryPolicy::default(),
    ))
  }

  #[tokio::test]
  async fn test_get_wallet_details() {
    let api = wallet_api(ScriptedTransport::new().then(HttpResponse::json(
      StatusCode::OK,
      &json!({ "data": { "address": ADDRESS, "nodes": 4, "email": "ada@flipit.io" } }),
    )));

    let wallet = api.get_wallet_details(ADDRESS).await.unwrap();

    assert_eq!(wallet.address, ADDRESS);
    assert_eq!(wallet.nodes, Some(4));
    let request = api.client().transport().last_request();
    assert_eq!(request.url, format!("http://localhost:4000/wallet/{}", ADDRESS));
  }

  #[tokio::test]
  async fn test_wallet_details_revalidate_with_etag() {
    let api = wallet_api(
      ScriptedTransport::new()
        .then(
          HttpResponse::json(StatusCode::OK, &json!({ "data": { "address": ADDRESS, "nodes": 1 } }))
            .with_header("ETag", "W/\"abc\""),
        )
        .then(HttpResponse::new(StatusCode::NOT_MODIFIED)),
    );

    let first = api.get_wallet_details(ADDRESS).await.unwrap();
    let second = api.get_wallet_details(ADDRESS).await.unwrap();

    assert_eq!(first, second);
    assert!(api
      .client()
      .transport()
      .last_request()
      .headers
      .contains_key(IF_NONE_MATCH));
  }

  #[tokio::test]
  async fn test_invalid_address_sends_nothing() {
    let api = wallet_api(ScriptedTransport::new());

    let err = api.get_wallet_transactions("not-a-wallet").await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(api.client().transport().calls(), 0);
  }

  #[tokio::test]
  async fn test_update_wallet_details_posts_camel_case() {
    let api = wallet_api(ScriptedTransport::new().then(HttpResponse::json(
      StatusCode::OK,
      &json!({ "data": { "address": ADDRESS, "firstName": "Ada" } }),
    )));

    let request = UpdateWalletRequest {
      address: ADDRESS.to_string(),
      first_name: Some("Ada".to_string()),
      ..Default::default()
    };
    let wallet = api.update_wallet_details(&request).await.unwrap();

    assert_eq!(wallet.first_name.as_deref(), Some("Ada"));
    let sent = api.client().transport().last_request();
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.url, "http://localhost:4000/wallet/update");
    let body: serde_json::Value = serde_json::from_slice(&sent.body.unwrap()).unwrap();
    assert_eq!(body, json!({ "address": ADDRESS, "firstName": "Ada" }));
  }

  #[tokio::test]
  async fn test_submit_email_surfaces_server_error() {
    let api = wallet_api(ScriptedTransport::new().then(HttpResponse::json(
      StatusCode::BAD_REQUEST,
      &json!({ "error": "Wallet and email are required" }),
    )));

    let err = api.submit_email("ada@flipit.io", ADDRESS).await.unwrap_err();

    assert_eq!(err.to_string(), "Wallet and email are required");
    let sent = api.client().transport().last_request();
    assert_eq!(sent.url, "http://localhost:4000/email-submit");
    assert!(!sent.headers.contains_key(IF_NONE_MATCH));
  }

  #[tokio::test]
  async fn test_submit_email_accepts_empty_data() {
    let api = wallet_api(
      ScriptedTransport::new().then(HttpResponse::json(StatusCode::OK, &json!({ "success": true }))),
    );

    api.submit_email("ada@flipit.io", ADDRESS).await.unwrap();
  }
}
