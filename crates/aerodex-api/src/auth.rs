//! `x-api-key` header check.

use axum::http::HeaderMap;

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Accept the request only when `x-api-key` exactly equals `expected`.
pub fn verify_api_key(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
  let presented = headers
    .get(API_KEY_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;
  if presented == expected { Ok(()) } else { Err(ApiError::Unauthorized) }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(key: Option<&'static str>) -> HeaderMap {
    let mut map = HeaderMap::new();
    if let Some(k) = key {
      map.insert(API_KEY_HEADER, HeaderValue::from_static(k));
    }
    map
  }

  #[test]
  fn matching_key() {
    assert!(verify_api_key(&headers(Some("secret")), "secret").is_ok());
  }

  #[test]
  fn wrong_key() {
    assert!(matches!(verify_api_key(&headers(Some("Secret")), "secret"), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn missing_key() {
    assert!(matches!(verify_api_key(&headers(None), "secret"), Err(ApiError::Unauthorized)));
  }
}
