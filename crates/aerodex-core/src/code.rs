//! Normalisation and validation of short aviation codes used as natural keys.

use crate::{Error, Result};

/// Trim and uppercase a code so that every natural key compares the same way
/// regardless of where it came from.
pub fn normalize(raw: &str) -> String { raw.trim().to_ascii_uppercase() }

/// A normalised ICAO 24-bit transponder address: exactly six hex digits.
pub fn icao_hex(raw: &str) -> Result<String> {
  let code = normalize(raw);
  if code.len() == 6 && code.bytes().all(|b| b.is_ascii_hexdigit()) {
    Ok(code)
  } else {
    Err(Error::invalid(format!("'icao_hex' must be 6 hexadecimal characters, got {raw:?}")))
  }
}

/// A normalised ICAO airport code: four ASCII alphanumerics.
pub fn airport_icao(raw: &str, field: &str) -> Result<String> {
  let code = normalize(raw);
  if code.len() == 4 && code.bytes().all(|b| b.is_ascii_alphanumeric()) {
    Ok(code)
  } else {
    Err(Error::invalid(format!("'{field}' must be a 4 character ICAO airport code")))
  }
}

/// Require a non-empty (after trimming) string field.
pub fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(Error::invalid(format!("'{field}' is required and must be a non-empty string"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn icao_hex_is_normalised() {
    assert_eq!(icao_hex(" abc123 ").unwrap(), "ABC123");
  }

  #[test]
  fn icao_hex_rejects_non_hex() {
    assert!(icao_hex("ABC12G").is_err());
    assert!(icao_hex("ABC1234").is_err());
  }

  #[test]
  fn required_names_the_field() {
    let err = required(Some("   "), "name").unwrap_err();
    assert!(err.to_string().contains("'name'"));
    assert!(required(None, "callsign").unwrap_err().to_string().contains("callsign"));
  }

  #[test]
  fn airport_codes_must_have_four_characters() {
    assert_eq!(airport_icao("kmco", "origin").unwrap(), "KMCO");
    assert!(airport_icao("MCO", "origin").is_err());
  }
}
