use serde::{Deserialize, Serialize};

/// Flipit node ownership attached to a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipitData {
  pub nodes: u64,
  pub email: String,
}

/// Profile and node counts stored for a wallet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  pub address: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nodes: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub level: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub flipit: Option<FlipitData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub nick_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub country: Option<String>,
}

/// Body of `POST /wallet/update`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalletRequest {
  pub address: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nick_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub country: Option<String>,
}

/// Body of `POST /email-submit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSubmission<'a> {
  pub email: &'a str,
  pub address: &'a str,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_wallet_data_camel_case() {
    let wallet: WalletData = serde_json::from_value(json!({
      "address": "0xabc",
      "firstName": "Ada",
      "nickName": "ada",
      "nodes": 3,
      "flipit": { "nodes": 2, "email": "ada@flipit.io" }
    }))
    .unwrap();

    assert_eq!(wallet.first_name.as_deref(), Some("Ada"));
    assert_eq!(wallet.nick_name.as_deref(), Some("ada"));
    assert_eq!(wallet.nodes, Some(3));
    assert_eq!(wallet.flipit.unwrap().nodes, 2);
    assert!(wallet.country.is_none());
  }

  #[test]
  fn test_new_wallet_has_only_an_address() {
    let wallet: WalletData = serde_json::from_value(json!({ "address": "0xabc" })).unwrap();

    assert_eq!(wallet.address, "0xabc");
    assert!(wallet.nodes.is_none());
    assert!(wallet.flipit.is_none());
    assert!(wallet.id.is_none());
  }

  #[test]
  fn test_update_request_omits_unset_fields() {
    let request = UpdateWalletRequest {
      address: "0xabc".to_string(),
      email: Some("a@b.co".to_string()),
      ..Default::default()
    };

    assert_eq!(
      serde_json::to_value(&request).unwrap(),
      json!({ "address": "0xabc", "email": "a@b.co" })
    );
  }
}
