//! `GET /heartbeat`: unauthenticated liveness check that touches the store.

use aerodex_core::store::AviationStore;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::error;

use crate::AppState;

pub async fn handler<S>(state: &AppState<S>) -> Response
where
  S: AviationStore + Clone + 'static,
{
  match state.store.health().await {
    Ok(version) => Json(json!({
      "time":    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
      "status":  "ok",
      "version": version,
    }))
    .into_response(),
    Err(e) => {
      error!(error = %e, "heartbeat failed");
      (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "database unavailable" })))
        .into_response()
    }
  }
}
