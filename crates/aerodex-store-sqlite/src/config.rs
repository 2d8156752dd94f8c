//! The `database` settings table shared by the API server and the importer.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{Result, SqliteStore};

/// Where the store lives. `uri` is the directory holding the database file
/// and `name` its stem; the uri `:memory:` selects an in-memory database.
///
/// `username` and `password` are accepted for parity with networked
/// backends and ignored by SQLite.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
  pub uri:      String,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
  pub name:     String,
}

pub const IN_MEMORY: &str = ":memory:";

impl DatabaseConfig {
  /// `{uri}/{name}.sqlite3`, or `None` for an in-memory store.
  pub fn store_path(&self) -> Option<PathBuf> {
    if self.uri == IN_MEMORY {
      return None;
    }
    Some(PathBuf::from(&self.uri).join(format!("{}.sqlite3", self.name)))
  }

  /// Open the configured store, creating its directory when needed.
  pub async fn open(&self) -> Result<SqliteStore> {
    match self.store_path() {
      None => SqliteStore::open_in_memory().await,
      Some(path) => {
        if let Some(dir) = path.parent() {
          std::fs::create_dir_all(dir)?;
        }
        SqliteStore::open(path).await
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(uri: &str) -> DatabaseConfig {
    DatabaseConfig {
      uri:      uri.into(),
      username: String::new(),
      password: String::new(),
      name:     "aerodex".into(),
    }
  }

  #[test]
  fn path_joins_uri_and_name() {
    assert_eq!(config("/var/lib/aerodex").store_path(), Some(PathBuf::from("/var/lib/aerodex/aerodex.sqlite3")));
    assert_eq!(config(IN_MEMORY).store_path(), None);
  }

  #[tokio::test]
  async fn memory_uri_opens() {
    assert!(config(IN_MEMORY).open().await.is_ok());
  }
}
