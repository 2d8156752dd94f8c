//! aerodex API server binary.
//!
//! Reads `settings.toml` (or the path given with `--config`), overlays
//! `AERODEX_*` environment variables, opens the SQLite store and serves the
//! HTTP API.

use std::{path::PathBuf, sync::Arc};

use aerodex_api::{AppState, Settings};
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "aerodex aviation data API")]
struct Cli {
  /// Path to the TOML settings file.
  #[arg(short, long, default_value = "settings.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to read settings from {:?}", cli.config))?;
  settings.validate().context("invalid settings")?;

  let level = settings.log_level.as_deref().unwrap_or("info");
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("invalid log_level")?,
    )
    .init();

  let store = settings
    .database
    .open()
    .await
    .with_context(|| format!("failed to open database {:?}", settings.database.name))?;

  let address = format!("{}:{}", settings.api.host, settings.api.port);
  let state = AppState {
    store:    Arc::new(store),
    settings: Arc::new(settings),
  };
  let app = aerodex_api::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
