//! Importer settings file.
//!
//! ```toml
//! log_file = "events.log"
//!
//! [database]
//! uri      = "/var/lib/aerodex"
//! username = "aerodex"
//! password = "..."
//! name     = "aerodex"
//!
//! [flightaware]
//! x-apikey               = "..."
//! max_pages              = 5
//! page_depth             = 1
//! ttl_days               = 30
//! sleep_duration_seconds = 65
//! ```

use std::{path::Path, time::Duration};

use aerodex_store_sqlite::DatabaseConfig;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://aeroapi.flightaware.com/aeroapi";

#[derive(Debug, Deserialize)]
pub struct ImportSettings {
  pub database:    DatabaseConfig,
  #[serde(default = "default_log_file")]
  pub log_file:    String,
  #[serde(default)]
  pub flightaware: FlightAwareFile,
}

fn default_log_file() -> String { "events.log".to_owned() }

/// The `[flightaware]` table as written; every tunable is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FlightAwareFile {
  #[serde(rename = "x-apikey", default)]
  pub api_key:                String,
  pub base_url:               Option<String>,
  pub max_pages:              Option<u32>,
  pub page_depth:             Option<u32>,
  pub ttl_days:               Option<u32>,
  pub sleep_duration_seconds: Option<u64>,
}

/// Overrides taken from the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlightAwareOverrides {
  pub max_pages:  Option<u32>,
  pub page_depth: Option<u32>,
  pub ttl_days:   Option<u32>,
  pub sleep:      Option<u64>,
}

/// Fully resolved AeroAPI settings.
#[derive(Debug, Clone)]
pub struct FlightAware {
  pub api_key:    String,
  pub base_url:   String,
  pub max_pages:  u32,
  pub page_depth: u32,
  pub ttl_days:   u32,
  pub sleep:      Duration,
}

impl ImportSettings {
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading settings file {}", path.display()))?;
    Self::parse(&raw).with_context(|| format!("parsing settings file {}", path.display()))
  }

  pub fn parse(raw: &str) -> Result<Self> { Ok(toml::from_str(raw)?) }
}

impl FlightAwareFile {
  /// Apply overrides and defaults. Every default taken is logged as a
  /// warning; an empty API key is an error.
  pub fn resolve(&self, overrides: FlightAwareOverrides) -> Result<FlightAware> {
    if self.api_key.trim().is_empty() {
      bail!("flightaware.x-apikey is not set in the settings file");
    }

    Ok(FlightAware {
      api_key:    self.api_key.trim().to_owned(),
      base_url:   self
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
      max_pages:  tunable("max_pages", overrides.max_pages.or(self.max_pages), 5),
      page_depth: tunable("page_depth", overrides.page_depth.or(self.page_depth), 1),
      ttl_days:   tunable(
        "ttl_days",
        overrides.ttl_days.or(self.ttl_days),
        aerodex_core::flight::DEFAULT_TTL_DAYS as u32,
      ),
      sleep:      Duration::from_secs(tunable(
        "sleep_duration_seconds",
        overrides.sleep.or(self.sleep_duration_seconds),
        65,
      )),
    })
  }
}

fn tunable<T: Copy + std::fmt::Display>(name: &str, value: Option<T>, default: T) -> T {
  value.unwrap_or_else(|| {
    warn!("flightaware.{name} is not defined in the settings file; defaulting to {default}");
    default
  })
}
