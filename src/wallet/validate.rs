//! Client-side checks applied before a wallet request is sent.

use super::types::UpdateWalletRequest;

/// `0x` followed by 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
  let Some(hex) = address.strip_prefix("0x") else {
    return false;
  };
  hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// `local@domain.tld`, no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }

  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }

  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
    None => false,
  }
}

/// Validate an update request, collecting every problem found.
pub fn validate_update(request: &UpdateWalletRequest) -> Result<(), Vec<String>> {
  let mut errors = Vec::new();

  if request.address.is_empty() {
    errors.push("Address is required".to_string());
  } else if !is_valid_address(&request.address) {
    errors.push("Invalid address format".to_string());
  }

  if let Some(email) = request.email.as_deref() {
    if !is_valid_email(email) {
      errors.push("Invalid email format".to_string());
    }
  }

  check_length(&mut errors, request.first_name.as_deref(), 2, 50, "First name");
  check_length(&mut errors, request.last_name.as_deref(), 2, 50, "Last name");
  check_length(&mut errors, request.nick_name.as_deref(), 2, 30, "Nickname");

  if let Some(country) = request.country.as_deref() {
    if country.chars().count() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
      errors.push("Country must be a 2-letter ISO code".to_string());
    }
  }

  if errors.is_empty() {
    Ok(())
  } else {
    Err(errors)
  }
}

fn check_length(errors: &mut Vec<String>, value: Option<&str>, min: usize, max: usize, label: &str) {
  if let Some(value) = value {
    let len = value.chars().count();
    if len < min || len > max {
      errors.push(format!("{} must be between {} and {} characters", label, min, max));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

  #[test]
  fn test_address_format() {
    assert!(is_valid_address(ADDRESS));
    assert!(is_valid_address(&ADDRESS.to_lowercase()));
    assert!(!is_valid_address("52908400098527886E0F7030069857D2E4169EE7"));
    assert!(!is_valid_address("0x1234"));
    assert!(!is_valid_address("0xZZ908400098527886E0F7030069857D2E4169EE7"));
  }

  #[test]
  fn test_email_format() {
    assert!(is_valid_email("ada@flipit.io"));
    assert!(is_valid_email("a.b+c@mail.example.com"));
    assert!(!is_valid_email("ada@flipit"));
    assert!(!is_valid_email("ada flipit@x.io"));
    assert!(!is_valid_email("@flipit.io"));
    assert!(!is_valid_email("a@b@c.io"));
    assert!(!is_valid_email("ada@.io"));
  }

  #[test]
  fn test_validate_update_collects_errors() {
    let request = UpdateWalletRequest {
      address: "0x12".to_string(),
      email: Some("nope".to_string()),
      first_name: Some("A".to_string()),
      country: Some("USA".to_string()),
      ..Default::default()
    };

    let errors = validate_update(&request).unwrap_err();
    assert_eq!(errors.len(), 4);
    assert!(errors.contains(&"Invalid address format".to_string()));
    assert!(errors.contains(&"First name must be between 2 and 50 characters".to_string()));
  }

  #[test]
  fn test_validate_update_accepts_valid_request() {
    let request = UpdateWalletRequest {
      address: ADDRESS.to_string(),
      email: Some("ada@flipit.io".to_string()),
      nick_name: Some("ada".to_string()),
      country: Some("DE".to_string()),
      ..Default::default()
    };
    assert!(validate_update(&request).is_ok());
  }
}
