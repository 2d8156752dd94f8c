//! Aircraft registrations.
//!
//! The same logical aircraft may be described at two levels of richness,
//! held in two physical tables: a `simple` projection and a `detailed` one.
//! `icao_hex` is the stable join key across sources.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ContentHash, Error, Result, code};

// ─── Data type ───────────────────────────────────────────────────────────────

/// Which registration table a lookup or import targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
  #[default]
  Simple,
  Detailed,
}

impl DataType {
  pub fn as_str(self) -> &'static str {
    match self {
      DataType::Simple => "simple",
      DataType::Detailed => "detailed",
    }
  }

  /// The other table; used by the API's fallback redirect.
  pub fn opposite(self) -> Self {
    match self {
      DataType::Simple => DataType::Detailed,
      DataType::Detailed => DataType::Simple,
    }
  }
}

impl fmt::Display for DataType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for DataType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "simple" => Ok(DataType::Simple),
      "detailed" => Ok(DataType::Detailed),
      other => Err(Error::invalid(format!(
        "data type must be 'simple' or 'detailed', got {other:?}"
      ))),
    }
  }
}

// ─── Lookup key ──────────────────────────────────────────────────────────────

/// The column a registration lookup matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColumn {
  IcaoHex,
  Registration,
}

impl KeyColumn {
  pub fn as_str(self) -> &'static str {
    match self {
      KeyColumn::IcaoHex => "icao_hex",
      KeyColumn::Registration => "registration",
    }
  }
}

impl FromStr for KeyColumn {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "icao_hex" => Ok(KeyColumn::IcaoHex),
      "registration" => Ok(KeyColumn::Registration),
      _ => Err(Error::invalid("Either 'icao_hex' or 'registration' is required")),
    }
  }
}

/// Exactly one of an ICAO hex code or a registration mark, normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
  column: KeyColumn,
  value:  String,
}

impl LookupKey {
  pub fn new(column: KeyColumn, raw: &str) -> Result<Self> {
    let value = match column {
      KeyColumn::IcaoHex => code::icao_hex(raw)?,
      KeyColumn::Registration => {
        code::normalize(code::required(Some(raw), "registration")?)
      }
    };
    Ok(Self { column, value })
  }

  /// Build a key from two optional inputs, enforcing "one, never both,
  /// never neither".
  pub fn from_either(icao_hex: Option<&str>, registration: Option<&str>) -> Result<Self> {
    match (icao_hex, registration) {
      (Some(hex), None) => Self::new(KeyColumn::IcaoHex, hex),
      (None, Some(reg)) => Self::new(KeyColumn::Registration, reg),
      (Some(_), Some(_)) => {
        Err(Error::invalid("Only one of 'icao_hex' or 'registration' is allowed"))
      }
      (None, None) => Err(Error::invalid("Either 'icao_hex' or 'registration' is required")),
    }
  }

  pub fn column(&self) -> KeyColumn { self.column }

  pub fn value(&self) -> &str { &self.value }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The canonical field set of a registration as produced by a source
/// adapter. This is what gets hashed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationPayload {
  pub icao_hex:     String,
  pub registration: String,
  pub data:         Value,
}

impl RegistrationPayload {
  /// Normalise and validate a raw adapter record.
  pub fn new(icao_hex: &str, registration: &str, data: Value) -> Result<Self> {
    if !data.is_object() {
      return Err(Error::invalid("registration 'data' must be a JSON object"));
    }
    Ok(Self {
      icao_hex:     code::icao_hex(icao_hex)?,
      registration: code::normalize(code::required(Some(registration), "registration")?),
      data,
    })
  }
}

/// A stored registration row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRecord {
  pub unique_id:    i64,
  pub icao_hex:     String,
  pub registration: String,
  pub data:         Value,
  pub hash:         ContentHash,
  /// Agency name of the owning source.
  pub source:       String,
  pub deleted:      Option<DateTime<Utc>>,
}

impl RegistrationRecord {
  /// The JSON returned to API callers: the stored payload with the source
  /// agency folded in.
  pub fn into_view(self) -> Value {
    let mut view = self.data;
    if let Value::Object(map) = &mut view {
      map.insert("source".to_owned(), Value::String(self.source));
    }
    view
  }
}
