//! `aerodex-import`: batch importers for the aerodex store.
//!
//! # Usage
//!
//! ```
//! aerodex-import registrations --source US-FAA --data-type detailed https://example.org/faa.json
//! aerodex-import operators --source ICAO ./operators.json
//! aerodex-import airports --source OurAirports https://example.org/airports.json
//! aerodex-import flights KMCO
//! ```
//!
//! Every run is one transaction against the store: it either commits in
//! full or the process exits with code 1 and nothing changes.

mod adapter;
mod client;
mod settings;

use std::{
  fs::OpenOptions,
  path::{Path, PathBuf},
  sync::Mutex,
};

use aerodex_core::{
  code,
  reconcile::{ImportBatch, ReconcileReport},
  registration::DataType,
  store::AviationStore,
};
use aerodex_store_sqlite::SqliteStore;
use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use settings::{FlightAwareOverrides, ImportSettings};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Source name recorded for AeroAPI flights.
const FLIGHTAWARE_AGENCY: &str = "FlightAware";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "aerodex-import", version, about = "Batch importers for the aerodex store")]
struct Args {
  /// Path to the TOML settings file.
  #[arg(short, long, value_name = "FILE", default_value = "settings.toml")]
  config: PathBuf,

  /// Log file, overriding `log_file` from the settings file.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Reconcile a normalized registration extract into one table.
  Registrations {
    /// Agency the records are attributed to.
    #[arg(long)]
    source:    String,
    #[arg(long, default_value = "simple")]
    data_type: DataType,
    /// `http(s)://` URL or local path of the extract.
    download_url: String,
  },
  /// Reconcile an operator directory extract.
  Operators {
    #[arg(long)]
    source:       String,
    download_url: String,
  },
  /// Replace the airport directory.
  Airports {
    #[arg(long)]
    source:       String,
    download_url: String,
  },
  /// Refresh flight numbers from FlightAware arrivals at one airport.
  Flights {
    /// ICAO code of the airport, e.g. KMCO.
    icao_airport_code: String,
    #[arg(long)]
    max_pages:         Option<u32>,
    #[arg(long)]
    page_depth:        Option<u32>,
    #[arg(long)]
    ttl_days:          Option<u32>,
    #[arg(long)]
    sleep_seconds:     Option<u64>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
  let args = Args::parse();

  let settings = match ImportSettings::load(&args.config) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("{e:#}");
      std::process::exit(1);
    }
  };

  let log_file = args
    .log_file
    .clone()
    .unwrap_or_else(|| PathBuf::from(&settings.log_file));
  if let Err(e) = init_logging(&log_file) {
    eprintln!("{e:#}");
    std::process::exit(1);
  }

  info!("aerodex-import started");
  match run(args.command, settings).await {
    Ok(()) => info!("aerodex-import finished successfully"),
    Err(e) => {
      error!("{e:#}");
      info!("error; exiting with code 1");
      std::process::exit(1);
    }
  }
}

/// Log to stderr and append plain lines to `path`.
fn init_logging(path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    .try_init()
    .context("initialising logging")
}

async fn run(command: Command, settings: ImportSettings) -> Result<()> {
  let store = settings
    .database
    .open()
    .await
    .with_context(|| format!("opening database {:?}", settings.database.name))?;
  let http = client::http_client()?;

  match command {
    Command::Registrations { source, data_type, download_url } => {
      let bytes = client::fetch(&http, &download_url).await?;
      let records = adapter::registrations::parse(&bytes)?;
      reconcile(&store, source, ImportBatch::Registrations { data_type, records }).await
    }
    Command::Operators { source, download_url } => {
      let bytes = client::fetch(&http, &download_url).await?;
      let records = adapter::operators::parse(&bytes)?;
      reconcile(&store, source, ImportBatch::Operators(records)).await
    }
    Command::Airports { source, download_url } => {
      let bytes = client::fetch(&http, &download_url).await?;
      let airports = adapter::airports::parse(&bytes)?;
      if airports.is_empty() {
        bail!("airport extract contained no records; refusing to empty the directory");
      }
      let loaded = store
        .replace_airports(source.clone(), airports)
        .await
        .context("replacing airports")?;
      info!(source = %source, loaded, "airport directory replaced");
      Ok(())
    }
    Command::Flights { icao_airport_code, max_pages, page_depth, ttl_days, sleep_seconds } => {
      let airport = code::airport_icao(&icao_airport_code, "icao_airport_code")?;
      let fa = settings.flightaware.resolve(FlightAwareOverrides {
        max_pages,
        page_depth,
        ttl_days,
        sleep: sleep_seconds,
      })?;

      if store.get_airport(&airport).await.context("looking up airport")?.is_none() {
        warn!(airport = %airport, "airport is not in the airport directory");
      }

      let flights = adapter::flightaware::AeroApi::new(&http, &fa).arrivals(&airport).await?;
      let expires = Utc::now() + Duration::days(i64::from(fa.ttl_days));
      let report = store
        .refresh_flights(FLIGHTAWARE_AGENCY.to_owned(), flights, expires)
        .await
        .context("refreshing flight numbers")?;
      info!(
        airport = %airport,
        staged = report.staged,
        created = report.created,
        extended = report.extended,
        "created or updated flight numbers"
      );
      Ok(())
    }
  }
}

async fn reconcile(store: &SqliteStore, source: String, batch: ImportBatch) -> Result<()> {
  if batch.is_empty() {
    bail!("extract contained no records; refusing to deregister every row of {source}");
  }
  let report: ReconcileReport = store
    .reconcile(source.clone(), batch)
    .await
    .with_context(|| format!("reconciling records from {source}"))?;
  if report.duplicates > 0 {
    warn!(source = %source, duplicates = report.duplicates, "duplicate keys in extract; last record kept");
  }
  info!(
    source = %source,
    staged = report.staged,
    deregistered = report.deregistered,
    obsoleted = report.obsoleted,
    created = report.created,
    revived = report.revived,
    untouched = report.untouched,
    "reconciliation complete"
  );
  Ok(())
}
