//! Airports. The directory is small and authoritative, so every import
//! replaces it wholesale; there is no hashing and no soft delete.

use serde::{Deserialize, Serialize};

use crate::{Result, code};

/// Airports whose own name reads better than any city-prefixed variant.
const NAME_AS_IS: &[&str] =
  &["KIAD", "KDFW", "KRDU", "KCVG", "CYUL", "KEWR", "KPIE", "KROC"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
  pub icao_code: String,
  pub iata_code: Option<String>,
  pub name:      String,
  pub city:      String,
  pub region:    String,
  pub country:   String,
  /// Spoken, human-friendly name derived from the other fields.
  pub phonic:    String,
}

impl Airport {
  /// Build an airport from directory fields, deriving `phonic`. An IATA code
  /// that is empty or `"0"` is treated as absent.
  pub fn new(
    icao_code: &str,
    iata_code: Option<&str>,
    name: &str,
    city: &str,
    region: &str,
    country: &str,
  ) -> Result<Self> {
    let icao_code = code::airport_icao(icao_code, "icao_code")?;
    let iata_code = iata_code
      .map(code::normalize)
      .filter(|c| !c.is_empty() && c != "0");
    let name = name.trim().to_owned();
    let city = city.trim().to_owned();
    let phonic = derive_phonic(&icao_code, &name, &city);

    Ok(Self {
      icao_code,
      iata_code,
      name,
      city,
      region: region.trim().to_owned(),
      country: code::normalize(country),
      phonic,
    })
  }
}

/// Derive the spoken name of an airport, e.g. `KJFK` / "John F Kennedy
/// International Airport" / "New York" becomes "New York John F Kennedy".
pub fn derive_phonic(icao_code: &str, name: &str, city: &str) -> String {
  let city_words = city.replace(['/', '-'], " ");
  let start = if name.contains(&city_words) {
    name.to_owned()
  } else {
    format!("{city} {name}")
  };
  let mut phonic = strip_filler(&start);

  if name.to_lowercase().starts_with("greater") {
    return name.to_owned();
  }
  if NAME_AS_IS.contains(&icao_code) || name.contains(" of ") {
    return strip_filler(name);
  }
  match icao_code {
    "KMLB" => return "Melbourne".to_owned(),
    "KLGA" => return phonic.replace("La Guardia", "LaGuardia"),
    _ => {}
  }

  if !city.is_empty() && phonic.ends_with(city) {
    phonic = strip_filler(&format!("{city} {}", name.replace(city, "").trim()));
  }
  if phonic.ends_with('/') || phonic.ends_with('-') {
    phonic = strip_filler(name);
  }

  collapse_spaces(&phonic.replace(['/', '-'], " "))
}

fn strip_filler(s: &str) -> String {
  collapse_spaces(&s.replace("International", "").replace("Airport", ""))
}

fn collapse_spaces(s: &str) -> String { s.split_whitespace().collect::<Vec<_>>().join(" ") }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn city_already_in_name() {
    assert_eq!(derive_phonic("KMCO", "Orlando International Airport", "Orlando"), "Orlando");
  }

  #[test]
  fn city_is_prefixed() {
    assert_eq!(
      derive_phonic("KJFK", "John F Kennedy International Airport", "New York"),
      "New York John F Kennedy"
    );
  }

  #[test]
  fn trailing_city_moves_to_front() {
    assert_eq!(
      derive_phonic("KCMH", "John Glenn Columbus International Airport", "Columbus"),
      "Columbus John Glenn"
    );
  }

  #[test]
  fn special_cases() {
    assert_eq!(
      derive_phonic("KMLB", "Melbourne Orlando International Airport", "Melbourne"),
      "Melbourne"
    );
    assert_eq!(derive_phonic("KLGA", "La Guardia Airport", "New York"), "New York LaGuardia");
    assert_eq!(
      derive_phonic("KIAD", "Washington Dulles International Airport", "Washington"),
      "Washington Dulles"
    );
    assert_eq!(
      derive_phonic("KXYZ", "Greater Rochester International Airport", "Rochester"),
      "Greater Rochester International Airport"
    );
    assert_eq!(
      derive_phonic("KOUN", "University of Oklahoma Westheimer Airport", "Norman"),
      "University of Oklahoma Westheimer"
    );
  }

  #[test]
  fn slashes_and_dashes_become_spaces() {
    assert_eq!(derive_phonic("XXXX", "Foo-Bar Field", "Baz"), "Baz Foo Bar Field");
  }

  #[test]
  fn zero_iata_is_absent() {
    let a = Airport::new("kmco", Some("0"), "Orlando International Airport", "Orlando", "US-FL", "us")
      .unwrap();
    assert_eq!(a.icao_code, "KMCO");
    assert_eq!(a.iata_code, None);
    assert_eq!(a.country, "US");
    assert_eq!(a.phonic, "Orlando");
  }
}
