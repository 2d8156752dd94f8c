//! Flight numbers (flight info).
//!
//! Unlike registrations and operators these rows are not soft-deleted: a row
//! is live while `expires > now`. The canonical key for upsert, refresh and
//! delete alike is `(ident, origin, destination)`; several live rows for the
//! same `ident` are a *conflict*.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{ContentHash, Error, Result, code, operator::designator_code};

/// Lifetime given to a flight row when the writer does not choose one.
pub const DEFAULT_TTL_DAYS: i64 = 30;

/// The canonical, hashed field set of a flight number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightFields {
  pub ident:              String,
  pub airline_designator: String,
  pub flight_number:      String,
  pub origin:             String,
  pub destination:        String,
}

impl FlightFields {
  pub fn new(
    ident: &str,
    airline_designator: &str,
    flight_number: &str,
    origin: &str,
    destination: &str,
  ) -> Result<Self> {
    Ok(Self {
      ident:              ident_code(ident)?,
      airline_designator: designator_code(airline_designator)?,
      flight_number:      code::normalize(code::required(Some(flight_number), "flight_number")?),
      origin:             code::airport_icao(origin, "origin")?,
      destination:        code::airport_icao(destination, "destination")?,
    })
  }

  pub fn key(&self) -> FlightKey {
    FlightKey {
      ident:       self.ident.clone(),
      origin:      self.origin.clone(),
      destination: self.destination.clone(),
    }
  }

  pub fn content_hash(&self) -> Result<ContentHash> { ContentHash::of(self) }
}

/// Validate a flight ident such as `UAL123`.
pub fn ident_code(raw: &str) -> Result<String> {
  let ident = code::normalize(code::required(Some(raw), "ident")?);
  if ident.len() <= 10 && ident.bytes().all(|b| b.is_ascii_alphanumeric()) {
    Ok(ident)
  } else {
    Err(Error::invalid(format!("'ident' must be up to 10 alphanumeric characters, got {raw:?}")))
  }
}

/// The natural key of a flight row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightKey {
  pub ident:       String,
  pub origin:      String,
  pub destination: String,
}

impl FlightKey {
  pub fn new(ident: &str, origin: &str, destination: &str) -> Result<Self> {
    Ok(Self {
      ident:       ident_code(ident)?,
      origin:      code::airport_icao(origin, "origin")?,
      destination: code::airport_icao(destination, "destination")?,
    })
  }
}

/// A validated flight write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlight {
  pub fields:  FlightFields,
  pub source:  String,
  pub expires: DateTime<Utc>,
}

/// JSON body accepted by `POST /flight`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightBody {
  pub ident:              Option<String>,
  pub airline_designator: Option<String>,
  pub flight_number:      Option<String>,
  pub origin:             Option<String>,
  pub destination:        Option<String>,
  pub source:             Option<String>,
  /// Defaults to `now + DEFAULT_TTL_DAYS`.
  pub expires:            Option<DateTime<Utc>>,
}

impl FlightBody {
  pub fn into_new(self, now: DateTime<Utc>) -> Result<NewFlight> {
    let fields = FlightFields::new(
      code::required(self.ident.as_deref(), "ident")?,
      code::required(self.airline_designator.as_deref(), "airline_designator")?,
      code::required(self.flight_number.as_deref(), "flight_number")?,
      code::required(self.origin.as_deref(), "origin")?,
      code::required(self.destination.as_deref(), "destination")?,
    )?;
    let source = code::required(self.source.as_deref(), "source")?.to_owned();
    let expires = self.expires.unwrap_or_else(|| now + Duration::days(DEFAULT_TTL_DAYS));
    Ok(NewFlight { fields, source, expires })
  }
}

/// The JSON projection returned by `GET /flight/{ident}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightView {
  pub airline_designator: String,
  pub flight_number:      String,
  pub origin:             String,
  pub destination:        String,
}

/// A stored flight row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
  pub unique_id: i64,
  #[serde(flatten)]
  pub fields:    FlightFields,
  pub hash:      ContentHash,
  pub source:    String,
  pub expires:   DateTime<Utc>,
}

impl FlightRecord {
  pub fn into_view(self) -> FlightView {
    FlightView {
      airline_designator: self.fields.airline_designator,
      flight_number:      self.fields.flight_number,
      origin:             self.fields.origin,
      destination:        self.fields.destination,
    }
  }
}

/// One ident with more than one live row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightConflict {
  pub ident:   String,
  pub flights: Vec<FlightRecord>,
}

/// Group live rows by ident, keeping only idents with more than one row.
/// Output is ordered by ident; rows keep their input order.
pub fn group_conflicts(records: Vec<FlightRecord>) -> Vec<FlightConflict> {
  let mut grouped: std::collections::BTreeMap<String, Vec<FlightRecord>> = Default::default();
  for record in records {
    grouped.entry(record.fields.ident.clone()).or_default().push(record);
  }
  grouped
    .into_iter()
    .filter(|(_, flights)| flights.len() > 1)
    .map(|(ident, flights)| FlightConflict { ident, flights })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn record(id: i64, ident: &str, origin: &str) -> FlightRecord {
    let fields = FlightFields::new(ident, "UAL", "123", origin, "KORD").unwrap();
    FlightRecord {
      unique_id: id,
      hash: fields.content_hash().unwrap(),
      fields,
      source: "FlightAware".into(),
      expires: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
    }
  }

  #[test]
  fn expires_defaults_to_thirty_days() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let body = FlightBody {
      ident:              Some("ual123".into()),
      airline_designator: Some("UAL".into()),
      flight_number:      Some("123".into()),
      origin:             Some("KDEN".into()),
      destination:        Some("KORD".into()),
      source:             Some("manual".into()),
      expires:            None,
    };
    let flight = body.into_new(now).unwrap();
    assert_eq!(flight.expires, now + Duration::days(30));
    assert_eq!(flight.fields.ident, "UAL123");
  }

  #[test]
  fn missing_origin_is_named() {
    let body = FlightBody { ident: Some("UAL123".into()), ..Default::default() };
    let err = body.into_new(Utc::now()).unwrap_err();
    assert!(err.to_string().contains("airline_designator"));
  }

  #[test]
  fn conflicts_only_include_repeated_idents() {
    let conflicts = group_conflicts(vec![
      record(1, "UAL123", "KDEN"),
      record(2, "DAL9", "KATL"),
      record(3, "UAL123", "KSFO"),
    ]);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].ident, "UAL123");
    assert_eq!(conflicts[0].flights.len(), 2);
  }
}
