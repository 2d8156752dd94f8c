//! Operator directory feed: a JSON array of
//! `{airline_designator, name, callsign, country}` records.

use aerodex_core::{operator::OperatorFields, reconcile::Candidate};
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Record {
  airline_designator: String,
  name:               String,
  callsign:           String,
  country:            String,
}

pub fn parse(bytes: &[u8]) -> Result<Vec<Candidate<OperatorFields>>> {
  super::parse_array(bytes, "operator", |r: Record| {
    Candidate::operator(OperatorFields::new(
      &r.airline_designator,
      &r.name,
      &r.callsign,
      &r.country,
    )?)
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn operators_are_keyed_by_designator() {
    let raw = br#"[
      {"airline_designator": "aal", "name": "American Airlines", "callsign": "AMERICAN", "country": "US"},
      {"airline_designator": "DAL", "name": "Delta Air Lines", "callsign": "DELTA", "country": "US"}
    ]"#;
    let batch = parse(raw).unwrap();
    assert_eq!(batch.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(), vec!["AAL", "DAL"]);
    assert_eq!(batch[0].payload.name, "American Airlines");
  }

  #[test]
  fn empty_name_aborts() {
    let raw = br#"[{"airline_designator": "AAL", "name": "", "callsign": "AMERICAN", "country": "US"}]"#;
    assert!(parse(raw).is_err());
  }
}
