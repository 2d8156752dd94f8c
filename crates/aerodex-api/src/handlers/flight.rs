//! Flight number handlers.

use aerodex_core::{
  entity,
  flight::{FlightBody, FlightKey, ident_code},
  store::AviationStore,
};
use axum::{
  Json,
  body::Body,
  extract::Request,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  handlers::{json_body, no_content},
};

#[derive(Debug, Default, Deserialize)]
pub struct FlightQuery {
  pub airport_icao: Option<String>,
}

/// `GET /flight/{ident}?airport_icao=...`
pub async fn get<S>(
  state: &AppState<S>,
  ident: &str,
  query: &FlightQuery,
) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let view =
    entity::flight::get(state.store.as_ref(), ident, query.airport_icao.as_deref()).await?;
  Ok(Json(view).into_response())
}

/// `GET /flight/conflicts`
pub async fn conflicts<S>(state: &AppState<S>) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let conflicts = entity::flight::get_conflicts(state.store.as_ref()).await?;
  Ok(Json(conflicts).into_response())
}

/// `POST /flight` or `POST /flight/{ident}`. A path ident fills in a missing
/// body ident and must agree with a present one.
pub async fn post<S>(
  state: &AppState<S>,
  path_ident: Option<&str>,
  req: Request<Body>,
) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let mut body: FlightBody = json_body(req).await?;
  if let Some(path_ident) = path_ident {
    let path_ident = ident_code(path_ident)?;
    match body.ident.as_deref().map(ident_code).transpose()? {
      None => body.ident = Some(path_ident),
      Some(ident) if ident == path_ident => {}
      Some(_) => {
        return Err(ApiError::BadRequest("'ident' in the body does not match the path".to_owned()));
      }
    }
  }
  entity::flight::post(state.store.as_ref(), body.into_new(Utc::now())?).await?;
  Ok(no_content())
}

/// `DELETE /flight/{ident}/{origin}/{destination}`
pub async fn delete<S>(
  state: &AppState<S>,
  ident: &str,
  origin: &str,
  destination: &str,
) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let key = FlightKey::new(ident, origin, destination)?;
  entity::flight::delete(state.store.as_ref(), &key).await?;
  Ok(no_content())
}
