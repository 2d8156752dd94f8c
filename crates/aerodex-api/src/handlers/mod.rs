pub mod flight;
pub mod heartbeat;
pub mod operator;
pub mod options;
pub mod registration;

use axum::{
  body::Body,
  extract::Request,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Largest request body accepted.
const BODY_LIMIT: usize = 1024 * 1024;

/// Read a JSON request body: a non-JSON `Content-Type` is `415`, an empty or
/// malformed body is `400`.
pub(crate) async fn json_body<T: DeserializeOwned>(req: Request<Body>) -> Result<T, ApiError> {
  let is_json = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(';').next())
    .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));
  if !is_json {
    return Err(ApiError::UnsupportedMediaType);
  }

  let bytes = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
    .await
    .map_err(|_| ApiError::BadRequest("request body is too large".to_owned()))?;
  if bytes.iter().all(u8::is_ascii_whitespace) {
    return Err(ApiError::BadRequest("request body is required".to_owned()));
  }
  serde_json::from_slice(&bytes)
    .map_err(|e| ApiError::BadRequest(format!("request body is not valid JSON: {e}")))
}

pub(crate) fn no_content() -> Response { StatusCode::NO_CONTENT.into_response() }
