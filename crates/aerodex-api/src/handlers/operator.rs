//! | Method   | Path                    | Notes                               |
//! |----------|-------------------------|-------------------------------------|
//! | `GET`    | `/operator/{designator}` | `200` + operator fields             |
//! | `POST`   | `/operator`             | Body: all five fields; `204`        |
//! | `PATCH`  | `/operator/{designator}` | Designator only in the path; `204` |
//! | `DELETE` | `/operator/{designator}` | Soft delete; `204`                  |

use aerodex_core::{entity, operator::OperatorBody, store::AviationStore};
use axum::{
  Json,
  body::Body,
  extract::Request,
  response::{IntoResponse, Response},
};

use crate::{
  AppState,
  error::ApiError,
  handlers::{json_body, no_content},
};

pub async fn get<S>(state: &AppState<S>, designator: &str) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let fields = entity::operator::get(state.store.as_ref(), designator).await?;
  Ok(Json(fields).into_response())
}

pub async fn post<S>(state: &AppState<S>, req: Request<Body>) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let body: OperatorBody = json_body(req).await?;
  entity::operator::post(state.store.as_ref(), body.into_new()?).await?;
  Ok(no_content())
}

pub async fn patch<S>(
  state: &AppState<S>,
  designator: &str,
  req: Request<Body>,
) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let body: OperatorBody = json_body(req).await?;
  entity::operator::patch(state.store.as_ref(), body.into_patch(designator)?).await?;
  Ok(no_content())
}

pub async fn delete<S>(state: &AppState<S>, designator: &str) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  entity::operator::delete(state.store.as_ref(), designator).await?;
  Ok(no_content())
}
