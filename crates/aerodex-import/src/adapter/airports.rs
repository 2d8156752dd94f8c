//! Airport directory feed: a JSON array of
//! `{icao_code, iata_code?, name, city, region, country}` records. The
//! spoken `phonic` name is derived on the way in.

use aerodex_core::airport::Airport;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Record {
  icao_code: String,
  #[serde(default)]
  iata_code: Option<String>,
  name:      String,
  #[serde(default)]
  city:      String,
  #[serde(default)]
  region:    String,
  #[serde(default)]
  country:   String,
}

pub fn parse(bytes: &[u8]) -> Result<Vec<Airport>> {
  super::parse_array(bytes, "airport", |r: Record| {
    Airport::new(&r.icao_code, r.iata_code.as_deref(), &r.name, &r.city, &r.region, &r.country)
  })
}
