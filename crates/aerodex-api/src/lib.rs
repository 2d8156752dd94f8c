//! HTTP API for the aerodex aviation store.
//!
//! Exposes an axum [`Router`] backed by any [`AviationStore`]. Every
//! resource route is a single `any()` handler that authenticates and then
//! dispatches on the method, so unsupported methods answer `405` and
//! `OPTIONS` is answered everywhere without a key.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

pub use config::Settings;
pub use error::ApiError;

use std::sync::Arc;

use aerodex_core::store::AviationStore;
use axum::{
  Router,
  body::Body,
  extract::{Path, Query, Request, State},
  http::{HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
  routing::any,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use auth::verify_api_key;
use handlers::{flight, heartbeat, operator, options, registration};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AviationStore> {
  pub store:    Arc<S>,
  pub settings: Arc<Settings>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AviationStore + Clone + 'static,
{
  let static_dir = state.settings.api.static_dir.clone();

  let mut app = Router::new()
    .route("/heartbeat",                                any(heartbeat_route::<S>))
    .route("/registration/{key_type}/{value}",          any(registration_route::<S>))
    .route("/registration/{key_type}/{value}/{data_type}", any(registration_route::<S>))
    .route("/operator",                                 any(operator_collection_route::<S>))
    .route("/operator/{designator}",                    any(operator_route::<S>))
    .route("/flight",                                   any(flight_collection_route::<S>))
    .route("/flight/conflicts",                         any(flight_conflicts_route::<S>))
    .route("/flight/{ident}",                           any(flight_route::<S>))
    .route("/flight/{ident}/{origin}/{destination}",    any(flight_leg_route::<S>))
    .fallback(fallback_route::<S>)
    .with_state(state);

  if let Some(dir) = static_dir {
    app = app.nest_service("/manage", ServeDir::new(dir));
  }

  app
    .layer(SetResponseHeaderLayer::overriding(
      header::ACCESS_CONTROL_ALLOW_ORIGIN,
      HeaderValue::from_static("*"),
    ))
    .layer(TraceLayer::new_for_http())
}

// ─── Dispatch helpers ────────────────────────────────────────────────────────

/// Return `Some(401 response)` if the API key is missing or wrong.
/// OPTIONS skips auth.
fn check_auth<S>(method: &Method, req: &Request<Body>, state: &AppState<S>) -> Option<Response>
where
  S: AviationStore + Clone + 'static,
{
  if method == Method::OPTIONS {
    return None;
  }
  match verify_api_key(req.headers(), &state.settings.api.x_api_key) {
    Ok(()) => None,
    Err(e) => Some(e.into_response()),
  }
}

fn method_not_allowed() -> Response { ApiError::MethodNotAllowed.into_response() }

// ─── Route handlers ──────────────────────────────────────────────────────────

async fn heartbeat_route<S>(State(state): State<AppState<S>>, req: Request<Body>) -> Response
where
  S: AviationStore + Clone + 'static,
{
  match *req.method() {
    Method::OPTIONS => options::handler(),
    Method::GET => heartbeat::handler(&state).await,
    _ => method_not_allowed(),
  }
}

async fn registration_route<S>(
  State(state): State<AppState<S>>,
  Path(segments): Path<Vec<String>>,
  req: Request<Body>,
) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  match method {
    Method::OPTIONS => options::handler(),
    Method::GET => {
      let path = req.uri().path().to_owned();
      registration::get(&state, req.headers(), &path, &segments).await.into_response_or_err()
    }
    _ => method_not_allowed(),
  }
}

async fn operator_collection_route<S>(State(state): State<AppState<S>>, req: Request<Body>) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  match method {
    Method::OPTIONS => options::handler(),
    Method::POST => operator::post(&state, req).await.into_response_or_err(),
    _ => method_not_allowed(),
  }
}

async fn operator_route<S>(
  State(state): State<AppState<S>>,
  Path(designator): Path<String>,
  req: Request<Body>,
) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  match method {
    Method::OPTIONS => options::handler(),
    Method::GET => operator::get(&state, &designator).await.into_response_or_err(),
    Method::PATCH => operator::patch(&state, &designator, req).await.into_response_or_err(),
    Method::DELETE => operator::delete(&state, &designator).await.into_response_or_err(),
    _ => method_not_allowed(),
  }
}

async fn flight_collection_route<S>(State(state): State<AppState<S>>, req: Request<Body>) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  match method {
    Method::OPTIONS => options::handler(),
    Method::POST => flight::post(&state, None, req).await.into_response_or_err(),
    _ => method_not_allowed(),
  }
}

async fn flight_conflicts_route<S>(State(state): State<AppState<S>>, req: Request<Body>) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  match method {
    Method::OPTIONS => options::handler(),
    Method::GET => flight::conflicts(&state).await.into_response_or_err(),
    _ => method_not_allowed(),
  }
}

async fn flight_route<S>(
  State(state): State<AppState<S>>,
  Path(ident): Path<String>,
  req: Request<Body>,
) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  match method {
    Method::OPTIONS => options::handler(),
    // The query is only parsed once the key has been checked.
    Method::GET => match Query::<flight::FlightQuery>::try_from_uri(req.uri()) {
      Ok(Query(query)) => flight::get(&state, &ident, &query).await.into_response_or_err(),
      Err(e) => ApiError::BadRequest(e.body_text()).into_response(),
    },
    Method::POST => flight::post(&state, Some(&ident), req).await.into_response_or_err(),
    _ => method_not_allowed(),
  }
}

async fn flight_leg_route<S>(
  State(state): State<AppState<S>>,
  Path((ident, origin, destination)): Path<(String, String, String)>,
  req: Request<Body>,
) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  match method {
    Method::OPTIONS => options::handler(),
    Method::DELETE => {
      flight::delete(&state, &ident, &origin, &destination).await.into_response_or_err()
    }
    _ => method_not_allowed(),
  }
}

async fn fallback_route<S>(State(state): State<AppState<S>>, req: Request<Body>) -> Response
where
  S: AviationStore + Clone + 'static,
{
  let method = req.method().clone();
  if let Some(r) = check_auth(&method, &req, &state) { return r; }
  if method == Method::OPTIONS {
    options::handler()
  } else {
    StatusCode::NOT_FOUND.into_response()
  }
}

// ─── Helper trait ────────────────────────────────────────────────────────────

trait IntoResponseOrErr {
  fn into_response_or_err(self) -> Response;
}

impl IntoResponseOrErr for Result<Response, ApiError> {
  fn into_response_or_err(self) -> Response {
    match self {
      Ok(r) => r,
      Err(e) => e.into_response(),
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use aerodex_core::{
    reconcile::{Candidate, ImportBatch},
    registration::{DataType, RegistrationPayload},
  };
  use aerodex_store_sqlite::SqliteStore;
  use axum::http::{Request, StatusCode, header};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  const KEY: &str = "test-key";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:    Arc::new(store),
      settings: Arc::new(crate::config::tests::settings(KEY)),
    }
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    headers: Vec<(&str, &str)>,
    body: Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(state).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn authed(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> Response {
    send(state, method, uri, vec![("x-api-key", KEY)], body).await
  }

  async fn json_of(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn aal() -> Value {
    json!({
      "airline_designator": "aal",
      "name": "American Airlines",
      "callsign": "american",
      "country": "us",
      "source": "testsrc",
    })
  }

  fn flight(ident: &str, origin: &str, destination: &str) -> Value {
    json!({
      "ident": ident,
      "airline_designator": "UAL",
      "flight_number": "123",
      "origin": origin,
      "destination": destination,
      "source": "manual",
    })
  }

  // ── Auth, CORS, OPTIONS ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_or_wrong_key_is_401_without_body() {
    let state = make_state().await;
    let res = send(state.clone(), "GET", "/operator/AAL", vec![], None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(header::CONTENT_TYPE).is_none());

    let res = send(state, "GET", "/operator/AAL", vec![("x-api-key", "nope")], None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
  }

  #[tokio::test]
  async fn options_is_open_and_permissive() {
    let state = make_state().await;
    let res = send(state, "OPTIONS", "/anything/at/all", vec![], None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "*");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(res.headers().get(header::CONTENT_TYPE).is_none());
  }

  #[tokio::test]
  async fn every_response_allows_any_origin() {
    let state = make_state().await;
    let res = authed(state, "GET", "/operator/ZZZ", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(res.headers().get(header::CONTENT_TYPE).is_none());
  }

  #[tokio::test]
  async fn unknown_resource_is_404() {
    let state = make_state().await;
    assert_eq!(authed(state, "GET", "/aircraft/ABC123", None).await.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn heartbeat_needs_no_key() {
    let state = make_state().await;
    let res = send(state, "GET", "/heartbeat", vec![], None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_of(res).await;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().unwrap().starts_with("SQLite"));
  }

  // ── Operators ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn operator_crud_round_trip() {
    let state = make_state().await;
    let res = authed(state.clone(), "POST", "/operator", Some(aal())).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = authed(state.clone(), "GET", "/operator/AAL", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
      json_of(res).await,
      json!({
        "airline_designator": "AAL",
        "name": "American Airlines",
        "callsign": "AMERICAN",
        "country": "US",
      })
    );

    let res = authed(state.clone(), "DELETE", "/operator/AAL", None).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = authed(state, "GET", "/operator/AAL", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn duplicate_post_is_409() {
    let state = make_state().await;
    authed(state.clone(), "POST", "/operator", Some(aal())).await;
    let res = authed(state, "POST", "/operator", Some(aal())).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(json_of(res).await["error"].is_string());
  }

  #[tokio::test]
  async fn empty_name_is_400_naming_the_field() {
    let state = make_state().await;
    let mut body = aal();
    body["name"] = json!("");
    let res = authed(state, "POST", "/operator", Some(body)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_of(res).await["error"].as_str().unwrap().contains("name"));
  }

  #[tokio::test]
  async fn non_json_body_is_415() {
    let state = make_state().await;
    let res = send(
      state,
      "POST",
      "/operator",
      vec![("x-api-key", KEY), ("content-type", "text/plain")],
      None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
  }

  #[tokio::test]
  async fn empty_json_body_is_400() {
    let state = make_state().await;
    let res = send(
      state,
      "POST",
      "/operator",
      vec![("x-api-key", KEY), ("content-type", "application/json")],
      None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn patch_rejects_designator_in_body() {
    let state = make_state().await;
    authed(state.clone(), "POST", "/operator", Some(aal())).await;
    let res = authed(state, "PATCH", "/operator/AAL", Some(aal())).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn patch_unknown_designator_is_404() {
    let state = make_state().await;
    let mut body = aal();
    body.as_object_mut().unwrap().remove("airline_designator");
    let res = authed(state, "PATCH", "/operator/AAL", Some(body)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn unsupported_method_is_405() {
    let state = make_state().await;
    assert_eq!(
      authed(state.clone(), "PUT", "/operator/AAL", Some(aal())).await.status(),
      StatusCode::METHOD_NOT_ALLOWED
    );
    assert_eq!(
      authed(state, "GET", "/operator", None).await.status(),
      StatusCode::METHOD_NOT_ALLOWED
    );
  }

  // ── Registrations ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_registration_redirects_once() {
    let state = make_state().await;
    let res = authed(state.clone(), "GET", "/registration/icao_hex/ABC123", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers()[header::LOCATION].to_str().unwrap().to_owned();
    assert_eq!(location, "/registration/icao_hex/ABC123/detailed");
    assert_eq!(res.headers()[header::REFERER], "/registration/icao_hex/ABC123");

    let res = send(
      state,
      "GET",
      &location,
      vec![("x-api-key", KEY), ("referer", "/registration/icao_hex/ABC123")],
      None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn redirect_keeps_encoded_characters_in_one_segment() {
    let state = make_state().await;
    let res = authed(state.clone(), "GET", "/registration/registration/N%20123", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/registration/registration/N%20123/detailed");
    assert_eq!(res.headers()[header::REFERER], "/registration/registration/N%20123");

    let res = authed(state.clone(), "GET", "/registration/registration/ab%2Fcd", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers()[header::LOCATION].to_str().unwrap().to_owned();
    assert_eq!(location, "/registration/registration/AB%2FCD/detailed");

    // The redirect target still routes to the three-segment form.
    let res = send(
      state,
      "GET",
      &location,
      vec![("x-api-key", KEY), ("referer", "/registration/registration/ab%2Fcd")],
      None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn registration_found_in_simple_table() {
    let state = make_state().await;
    let payload = RegistrationPayload::new(
      "abc123",
      "n12345",
      json!({ "icao_hex": "ABC123", "registration": "N12345", "model": "C172" }),
    )
    .unwrap();
    state
      .store
      .reconcile(
        "US-FAA".into(),
        ImportBatch::Registrations {
          data_type: DataType::Simple,
          records:   vec![Candidate::registration(payload).unwrap()],
        },
      )
      .await
      .unwrap();

    let res = authed(state.clone(), "GET", "/registration/registration/N12345", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_of(res).await;
    assert_eq!(body["model"], "C172");
    assert_eq!(body["source"], "US-FAA");

    let res = authed(state, "GET", "/registration/icao_hex/ABC123/detailed", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn bad_registration_path_is_400() {
    let state = make_state().await;
    let res = authed(state.clone(), "GET", "/registration/tail/N1", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = authed(state, "GET", "/registration/icao_hex/ABC123/full", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  // ── Flights ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn flight_conflicts_follow_posts_and_deletes() {
    let state = make_state().await;
    for body in [flight("UAL123", "KDEN", "KORD"), flight("UAL123", "KSFO", "KORD")] {
      let res = authed(state.clone(), "POST", "/flight", Some(body)).await;
      assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let conflicts = json_of(authed(state.clone(), "GET", "/flight/conflicts", None).await).await;
    assert_eq!(conflicts[0]["ident"], "UAL123");
    assert_eq!(conflicts[0]["flights"].as_array().unwrap().len(), 2);

    let res = authed(state.clone(), "GET", "/flight/UAL123", None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let res = authed(state.clone(), "GET", "/flight/UAL123?airport_icao=KSFO", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
      json_of(res).await,
      json!({
        "airline_designator": "UAL",
        "flight_number": "123",
        "origin": "KSFO",
        "destination": "KORD",
      })
    );

    let res = authed(state.clone(), "DELETE", "/flight/UAL123/KDEN/KORD", None).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let conflicts = json_of(authed(state.clone(), "GET", "/flight/conflicts", None).await).await;
    assert!(conflicts.as_array().unwrap().is_empty());
    let res = authed(state, "DELETE", "/flight/UAL123/KDEN/KORD", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn flight_query_is_checked_after_the_key() {
    let state = make_state().await;
    let uri = "/flight/UAL1?airport_icao=KSFO&airport_icao=KDEN";
    let res = send(state.clone(), "GET", uri, vec![], None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = authed(state, "GET", uri, None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn flight_post_under_ident_path() {
    let state = make_state().await;
    let mut body = flight("UAL9", "KSFO", "KEWR");
    body.as_object_mut().unwrap().remove("ident");
    let res = authed(state.clone(), "POST", "/flight/ual9", Some(body)).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = authed(state, "POST", "/flight/UAL10", Some(flight("UAL9", "KSFO", "KEWR"))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }
}
