//! Fetching source extracts over HTTP or from a local copy.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use tracing::info;

/// Build the shared HTTP client.
pub fn http_client() -> Result<Client> {
  Client::builder()
    .timeout(Duration::from_secs(300))
    .user_agent(concat!("aerodex-import/", env!("CARGO_PKG_VERSION")))
    .build()
    .context("failed to build HTTP client")
}

/// `true` when `location` should be downloaded rather than read from disk.
pub fn is_remote(location: &str) -> bool {
  location.starts_with("http://") || location.starts_with("https://")
}

/// Read the whole extract at `location`: an `http(s)://` URL is downloaded,
/// anything else is treated as a path to a previously downloaded copy.
pub async fn fetch(client: &Client, location: &str) -> Result<Vec<u8>> {
  if !is_remote(location) {
    info!(path = location, "reading local extract");
    return tokio::fs::read(location)
      .await
      .with_context(|| format!("reading {location}"));
  }

  info!(url = location, "downloading extract");
  let resp = client
    .get(location)
    .send()
    .await
    .with_context(|| format!("GET {location} failed"))?;

  if !resp.status().is_success() {
    return Err(anyhow!("GET {location} → {}", resp.status()));
  }
  let body = resp.bytes().await.context("reading response body")?;
  info!(bytes = body.len(), "download complete");
  Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_http_schemes_are_remote() {
    assert!(is_remote("https://example.org/aircraft.json"));
    assert!(is_remote("http://localhost/a.json"));
    assert!(!is_remote("/tmp/aircraft.json"));
    assert!(!is_remote("ftp://example.org/a.json"));
  }

  #[tokio::test]
  async fn local_files_are_read_directly() {
    let path = std::env::temp_dir().join(format!("aerodex-fetch-{}.json", std::process::id()));
    tokio::fs::write(&path, b"[]").await.unwrap();
    let client = http_client().unwrap();
    let bytes = fetch(&client, path.to_str().unwrap()).await.unwrap();
    assert_eq!(bytes, b"[]");
    tokio::fs::remove_file(&path).await.unwrap();
  }
}
