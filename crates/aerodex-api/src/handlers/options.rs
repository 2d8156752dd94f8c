//! OPTIONS handler: no auth required, no body, no `Content-Type`.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};

pub fn handler() -> Response {
  (
    StatusCode::OK,
    [
      (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("*")),
      (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*")),
    ],
  )
    .into_response()
}
