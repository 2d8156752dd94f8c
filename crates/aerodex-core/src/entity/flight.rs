use tracing::{info, warn};

use super::exactly_one;
use crate::{
  Error, Result, code,
  flight::{FlightConflict, FlightKey, FlightView, NewFlight, group_conflicts, ident_code},
  store::AviationStore,
};

/// The single live flight for `ident`, optionally restricted to flights
/// touching `focus_airport`.
pub async fn get<S: AviationStore>(
  store: &S,
  ident: &str,
  focus_airport: Option<&str>,
) -> Result<FlightView> {
  let ident = ident_code(ident)?;
  let focus = focus_airport.map(|a| code::airport_icao(a, "airport_icao")).transpose()?;
  let rows = store.find_flights(&ident, focus.as_deref()).await.map_err(Error::store)?;
  let record = exactly_one(rows).inspect_err(|e| {
    if let Error::UnexpectedResult { found, .. } = e {
      warn!(%ident, ?focus, found, "multiple live flights");
    }
  })?;
  Ok(record.into_view())
}

pub async fn get_conflicts<S: AviationStore>(store: &S) -> Result<Vec<FlightConflict>> {
  let rows = store.conflicting_flights().await.map_err(Error::store)?;
  Ok(group_conflicts(rows))
}

pub async fn post<S: AviationStore>(store: &S, flight: NewFlight) -> Result<()> {
  let key = flight.fields.key();
  if store.upsert_flight(flight).await.map_err(Error::store)? {
    info!(ident = %key.ident, origin = %key.origin, destination = %key.destination, "flight written");
    Ok(())
  } else {
    Err(Error::NotModified)
  }
}

pub async fn delete<S: AviationStore>(store: &S, key: &FlightKey) -> Result<()> {
  match store.expire_flight(key).await.map_err(Error::store)? {
    0 => Err(Error::NotFound),
    1 => {
      info!(ident = %key.ident, origin = %key.origin, destination = %key.destination, "flight expired");
      Ok(())
    }
    found => Err(Error::UnexpectedResult { expected: "one expired row", found }),
  }
}
