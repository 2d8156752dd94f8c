//! API error type and its single [`IntoResponse`] mapping.
//!
//! Success bodies are raw entity projections; errors are `{"error": ...}`.
//! `401` and `404` carry no body and no `Content-Type`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Message returned for faults whose detail stays in the log.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("request body must be JSON")]
  UnsupportedMediaType,

  #[error("method not allowed")]
  MethodNotAllowed,

  #[error("{0}")]
  BadRequest(String),

  #[error(transparent)]
  Domain(#[from] aerodex_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use aerodex_core::Error as E;
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      ApiError::BadRequest(_) | ApiError::Domain(E::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
      ApiError::Domain(E::NotFound) => StatusCode::NOT_FOUND,
      ApiError::Domain(E::NotModified | E::UnexpectedResult { .. }) => StatusCode::CONFLICT,
      ApiError::Domain(E::Serialization(_) | E::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    match &self {
      ApiError::Unauthorized | ApiError::Domain(aerodex_core::Error::NotFound) => {
        status.into_response()
      }
      ApiError::Domain(e @ aerodex_core::Error::UnexpectedResult { .. }) => {
        warn!(error = %e, "unexpected row count");
        (status, Json(json!({ "error": e.to_string() }))).into_response()
      }
      _ if status.is_server_error() => {
        error!(error = ?self, "request failed");
        (status, Json(json!({ "error": UNKNOWN_ERROR }))).into_response()
      }
      _ => (status, Json(json!({ "error": self.to_string() }))).into_response(),
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::http::header;

  use super::*;

  #[test]
  fn not_found_has_no_content_type() {
    let res = ApiError::Domain(aerodex_core::Error::NotFound).into_response();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().get(header::CONTENT_TYPE).is_none());
  }

  #[test]
  fn not_modified_is_conflict() {
    let err = ApiError::Domain(aerodex_core::Error::NotModified);
    assert_eq!(err.status(), StatusCode::CONFLICT);
  }

  #[test]
  fn store_detail_is_withheld() {
    let inner = std::io::Error::other("disk on fire");
    let res = ApiError::Domain(aerodex_core::Error::store(inner)).into_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
  }
}
