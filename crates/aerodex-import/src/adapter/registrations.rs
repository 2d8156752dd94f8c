//! Normalized registration feed: a JSON array of
//! `{icao_hex, registration, data}` records.

use aerodex_core::{reconcile::Candidate, registration::RegistrationPayload};
use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Record {
  icao_hex:     String,
  registration: String,
  data:         Value,
}

pub fn parse(bytes: &[u8]) -> Result<Vec<Candidate<RegistrationPayload>>> {
  super::parse_array(bytes, "registration", |r: Record| {
    Candidate::registration(RegistrationPayload::new(&r.icao_hex, &r.registration, r.data)?)
  })
}
