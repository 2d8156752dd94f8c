//! Airline operators, keyed by ICAO/IATA airline designator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ContentHash, Error, Result, code};

/// The canonical, hashed field set of an operator. Also the JSON projection
/// returned by `GET /operator/{designator}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorFields {
  pub airline_designator: String,
  pub name:               String,
  pub callsign:           String,
  pub country:            String,
}

impl OperatorFields {
  /// Normalise raw values: designator, callsign and country are uppercased,
  /// the name is only trimmed. Every field must be non-empty.
  pub fn new(designator: &str, name: &str, callsign: &str, country: &str) -> Result<Self> {
    Ok(Self {
      airline_designator: designator_code(designator)?,
      name:               code::required(Some(name), "name")?.to_owned(),
      callsign:           code::normalize(code::required(Some(callsign), "callsign")?),
      country:            code::normalize(code::required(Some(country), "country")?),
    })
  }

  pub fn content_hash(&self) -> Result<ContentHash> { ContentHash::of(self) }
}

/// Validate an airline designator taken from a path or a body.
pub fn designator_code(raw: &str) -> Result<String> {
  let designator = code::normalize(code::required(Some(raw), "airline_designator")?);
  if (2..=3).contains(&designator.len())
    && designator.bytes().all(|b| b.is_ascii_alphanumeric())
  {
    Ok(designator)
  } else {
    Err(Error::invalid(format!(
      "'airline_designator' must be 2 or 3 alphanumeric characters, got {raw:?}"
    )))
  }
}

/// A validated operator write, attributed to a source agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOperator {
  pub fields: OperatorFields,
  pub source: String,
}

/// JSON body accepted by `POST /operator` and `PATCH /operator/{designator}`.
///
/// All fields are optional at the parsing stage so that validation can name
/// the offending field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorBody {
  pub airline_designator: Option<String>,
  pub name:               Option<String>,
  pub callsign:           Option<String>,
  pub country:            Option<String>,
  pub source:             Option<String>,
}

impl OperatorBody {
  /// Validate a `POST` body: all five fields required.
  pub fn into_new(self) -> Result<NewOperator> {
    let designator = code::required(self.airline_designator.as_deref(), "airline_designator")?;
    self.finish(designator)
  }

  /// Validate a `PATCH` body: the designator comes from the path and must
  /// not be repeated in the body.
  pub fn into_patch(self, designator: &str) -> Result<NewOperator> {
    if self.airline_designator.is_some() {
      return Err(Error::invalid(
        "'airline_designator' must not be supplied in the body; it is taken from the path",
      ));
    }
    self.finish(designator)
  }

  fn finish(&self, designator: &str) -> Result<NewOperator> {
    let fields = OperatorFields::new(
      designator,
      code::required(self.name.as_deref(), "name")?,
      code::required(self.callsign.as_deref(), "callsign")?,
      code::required(self.country.as_deref(), "country")?,
    )?;
    let source = code::required(self.source.as_deref(), "source")?.to_owned();
    Ok(NewOperator { fields, source })
  }
}

/// A stored operator row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorRecord {
  pub unique_id: i64,
  #[serde(flatten)]
  pub fields:    OperatorFields,
  pub hash:      ContentHash,
  pub source:    String,
  pub deleted:   Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn body() -> OperatorBody {
    OperatorBody {
      airline_designator: Some("aal".into()),
      name:               Some("  American Airlines ".into()),
      callsign:           Some("american".into()),
      country:            Some("us".into()),
      source:             Some("testsrc".into()),
    }
  }

  #[test]
  fn post_body_is_normalised() {
    let op = body().into_new().unwrap();
    assert_eq!(op.fields.airline_designator, "AAL");
    assert_eq!(op.fields.name, "American Airlines");
    assert_eq!(op.fields.callsign, "AMERICAN");
    assert_eq!(op.fields.country, "US");
    assert_eq!(op.source, "testsrc");
  }

  #[test]
  fn empty_name_is_named_in_error() {
    let mut b = body();
    b.name = Some(String::new());
    let err = b.into_new().unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(ref m) if m.contains("'name'")));
  }

  #[test]
  fn patch_rejects_designator_in_body() {
    assert!(body().into_patch("AAL").is_err());

    let mut b = body();
    b.airline_designator = None;
    let op = b.into_patch("aal").unwrap();
    assert_eq!(op.fields.airline_designator, "AAL");
  }

  #[test]
  fn hash_ignores_source_and_whitespace() {
    let a = body().into_new().unwrap();
    let mut b = body();
    b.source = Some("other".into());
    b.name = Some("American Airlines".into());
    let b = b.into_new().unwrap();
    assert_eq!(a.fields.content_hash().unwrap(), b.fields.content_hash().unwrap());
  }

  #[test]
  fn designator_length_is_checked() {
    assert!(designator_code("A").is_err());
    assert!(designator_code("ABCD").is_err());
    assert_eq!(designator_code(" ua ").unwrap(), "UA");
  }
}
