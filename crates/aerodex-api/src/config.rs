//! Server settings, layered from a TOML file and `AERODEX_` environment
//! variables, validated once at startup.

use std::path::{Path, PathBuf};

use aerodex_store_sqlite::DatabaseConfig;
use serde::Deserialize;
use thiserror::Error;

/// The API key shipped in the sample configuration. Never accepted.
pub const PUBLISHED_DEFAULT_KEY: &str = "5d95bb51-64b1-4269-b812-2e20e59cb3c5";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub api:       ApiSettings,
  pub database:  DatabaseConfig,
  #[serde(default)]
  pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
  #[serde(rename = "x-api-key")]
  pub x_api_key:  String,
  pub port:       u16,
  #[serde(default = "default_host")]
  pub host:       String,
  /// Directory served at `/manage` without authentication.
  #[serde(default)]
  pub static_dir: Option<PathBuf>,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
  #[error("api.x-api-key must not be empty")]
  EmptyApiKey,
  #[error("api.x-api-key is still the published default; generate a new key")]
  DefaultApiKey,
  #[error("api.port must not be 0")]
  ZeroPort,
  #[error("database.{0} must not be empty")]
  EmptyDatabaseField(&'static str),
}

impl Settings {
  /// Read `path` (optional) and overlay `AERODEX_*` variables, e.g.
  /// `AERODEX_API__PORT=8080`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("AERODEX").prefix_separator("_").separator("__"))
      .build()?
      .try_deserialize()
  }

  pub fn validate(&self) -> Result<(), SettingsError> {
    let key = self.api.x_api_key.trim();
    if key.is_empty() {
      return Err(SettingsError::EmptyApiKey);
    }
    if key == PUBLISHED_DEFAULT_KEY {
      return Err(SettingsError::DefaultApiKey);
    }
    if self.api.port == 0 {
      return Err(SettingsError::ZeroPort);
    }
    if self.database.uri.trim().is_empty() {
      return Err(SettingsError::EmptyDatabaseField("uri"));
    }
    if self.database.name.trim().is_empty() {
      return Err(SettingsError::EmptyDatabaseField("name"));
    }
    Ok(())
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) fn settings(key: &str) -> Settings {
    Settings {
      api:       ApiSettings {
        x_api_key:  key.to_owned(),
        port:       8080,
        host:       default_host(),
        static_dir: None,
      },
      database:  DatabaseConfig {
        uri:      ":memory:".to_owned(),
        username: String::new(),
        password: String::new(),
        name:     "aerodex".to_owned(),
      },
      log_level: None,
    }
  }

  #[test]
  fn valid_settings_pass() {
    assert_eq!(settings("s3cret").validate(), Ok(()));
  }

  #[test]
  fn default_and_empty_keys_are_rejected() {
    assert_eq!(settings(PUBLISHED_DEFAULT_KEY).validate(), Err(SettingsError::DefaultApiKey));
    assert_eq!(settings("  ").validate(), Err(SettingsError::EmptyApiKey));
  }

  #[test]
  fn empty_database_name_is_rejected() {
    let mut s = settings("s3cret");
    s.database.name = String::new();
    assert_eq!(s.validate(), Err(SettingsError::EmptyDatabaseField("name")));
  }

  #[test]
  fn toml_uses_hyphenated_key() {
    let raw = r#"
      [api]
      x-api-key = "abc"
      port = 8080

      [database]
      uri = "/var/lib/aerodex"
      username = "aerodex"
      password = "pw"
      name = "aerodex"
    "#;
    let s: Settings = config::Config::builder()
      .add_source(config::File::from_str(raw, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(s.api.x_api_key, "abc");
    assert_eq!(s.api.host, "0.0.0.0");
    assert!(s.api.static_dir.is_none());
  }
}
