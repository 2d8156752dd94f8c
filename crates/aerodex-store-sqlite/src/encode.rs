//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that SQL string comparison orders them
//! correctly. Registration payloads are stored as compact JSON.

use aerodex_core::{
  ContentHash,
  airport::Airport,
  flight::{FlightFields, FlightRecord},
  operator::{OperatorFields, OperatorRecord},
  registration::RegistrationRecord,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn now() -> String { encode_dt(Utc::now()) }

// ─── ContentHash ─────────────────────────────────────────────────────────────

/// Read a hash column inside a row-mapping closure.
pub fn hash_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<ContentHash> {
  let raw: String = row.get(idx)?;
  ContentHash::parse(&raw).map_err(|e| {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from a registration table joined with `sources`.
pub struct RawRegistration {
  pub unique_id:    i64,
  pub icao_hex:     String,
  pub registration: String,
  pub data:         String,
  pub hash:         String,
  pub agency:       String,
  pub deleted:      Option<String>,
}

impl RawRegistration {
  pub const COLUMNS: &'static str =
    "r.unique_id, r.icao_hex, r.registration, r.data, r.hash, s.agency, r.deleted";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      unique_id:    row.get(0)?,
      icao_hex:     row.get(1)?,
      registration: row.get(2)?,
      data:         row.get(3)?,
      hash:         row.get(4)?,
      agency:       row.get(5)?,
      deleted:      row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<RegistrationRecord> {
    Ok(RegistrationRecord {
      unique_id:    self.unique_id,
      icao_hex:     self.icao_hex,
      registration: self.registration,
      data:         serde_json::from_str(&self.data)?,
      hash:         ContentHash::parse(&self.hash)?,
      source:       self.agency,
      deleted:      self.deleted.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read from `operators` joined with `sources`.
pub struct RawOperator {
  pub unique_id: i64,
  pub fields:    OperatorFields,
  pub hash:      String,
  pub agency:    String,
  pub deleted:   Option<String>,
}

impl RawOperator {
  pub const COLUMNS: &'static str = "o.unique_id, o.airline_designator, o.name, o.callsign, o.country, \
                             o.hash, s.agency, o.deleted";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      unique_id: row.get(0)?,
      fields:    OperatorFields {
        airline_designator: row.get(1)?,
        name:               row.get(2)?,
        callsign:           row.get(3)?,
        country:            row.get(4)?,
      },
      hash:      row.get(5)?,
      agency:    row.get(6)?,
      deleted:   row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<OperatorRecord> {
    Ok(OperatorRecord {
      unique_id: self.unique_id,
      fields:    self.fields,
      hash:      ContentHash::parse(&self.hash)?,
      source:    self.agency,
      deleted:   self.deleted.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read from `flight_numbers` joined with `sources`.
pub struct RawFlight {
  pub unique_id: i64,
  pub fields:    FlightFields,
  pub hash:      String,
  pub agency:    String,
  pub expires:   String,
}

impl RawFlight {
  pub const COLUMNS: &'static str = "f.unique_id, f.ident, f.airline_designator, f.flight_number, \
                             f.origin, f.destination, f.hash, s.agency, f.expires";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      unique_id: row.get(0)?,
      fields:    FlightFields {
        ident:              row.get(1)?,
        airline_designator: row.get(2)?,
        flight_number:      row.get(3)?,
        origin:             row.get(4)?,
        destination:        row.get(5)?,
      },
      hash:      row.get(6)?,
      agency:    row.get(7)?,
      expires:   row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<FlightRecord> {
    Ok(FlightRecord {
      unique_id: self.unique_id,
      fields:    self.fields,
      hash:      ContentHash::parse(&self.hash)?,
      source:    self.agency,
      expires:   decode_dt(&self.expires)?,
    })
  }
}

pub const AIRPORT_COLUMNS: &str = "icao_code, iata_code, name, city, region, country, phonic";

pub fn airport_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Airport> {
  Ok(Airport {
    icao_code: row.get(0)?,
    iata_code: row.get(1)?,
    name:      row.get(2)?,
    city:      row.get(3)?,
    region:    row.get(4)?,
    country:   row.get(5)?,
    phonic:    row.get(6)?,
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_ordered() {
    let a = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(1500);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }
}
