//! `GET /registration/{icao_hex|registration}/{value}[/{simple|detailed}]`
//!
//! When no data type is given the `simple` table is tried first; a miss
//! redirects once to the `detailed` table. The redirect carries a `referer`
//! header so that a second miss ends in `404` instead of bouncing back.

use aerodex_core::{
  Error, entity,
  registration::{DataType, KeyColumn, LookupKey},
  store::AviationStore,
};
use axum::{
  Json,
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::debug;

use crate::{AppState, error::ApiError};

/// Characters that cannot appear raw inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
  .add(b' ')
  .add(b'"')
  .add(b'#')
  .add(b'%')
  .add(b'/')
  .add(b'<')
  .add(b'>')
  .add(b'?')
  .add(b'`')
  .add(b'{')
  .add(b'}');

pub async fn get<S>(
  state: &AppState<S>,
  headers: &HeaderMap,
  path: &str,
  segments: &[String],
) -> Result<Response, ApiError>
where
  S: AviationStore + Clone + 'static,
{
  let (column, value, data_type) = match segments {
    [column, value] => (column, value, None),
    [column, value, data_type] => (column, value, Some(data_type.parse::<DataType>()?)),
    _ => return Err(ApiError::BadRequest("unexpected path".to_owned())),
  };
  let column: KeyColumn = column.parse()?;
  let key = LookupKey::new(column, value)?;
  let table = data_type.unwrap_or_default();

  match entity::registration::get(state.store.as_ref(), table, &key).await {
    Ok(record) => Ok(Json(record.into_view()).into_response()),
    Err(Error::NotFound) if data_type.is_none() && !headers.contains_key(header::REFERER) => {
      let location = format!(
        "/registration/{}/{}/{}",
        column.as_str(),
        utf8_percent_encode(key.value(), SEGMENT),
        table.opposite()
      );
      debug!(%location, "registration missing, redirecting to other table");
      redirect(&location, path)
    }
    Err(e) => Err(e.into()),
  }
}

fn redirect(location: &str, referer: &str) -> Result<Response, ApiError> {
  let location = HeaderValue::from_str(location)
    .map_err(|_| ApiError::BadRequest("value cannot be used in a redirect".to_owned()))?;
  let referer = HeaderValue::from_str(referer)
    .map_err(|_| ApiError::BadRequest("path cannot be used in a redirect".to_owned()))?;
  Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location), (header::REFERER, referer)]).into_response())
}
