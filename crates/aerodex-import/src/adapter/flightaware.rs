//! FlightAware AeroAPI airport arrivals.
//!
//! Two feeds are read for an airport, `arrivals` then `scheduled_arrivals`,
//! each followed through `links.next` for up to `page_depth` pages. AeroAPI
//! throttles aggressively, so a `429` is retried after a fixed sleep for as
//! long as it keeps happening, and every page turn is preceded by the same
//! sleep.

use aerodex_core::flight::FlightFields;
use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::settings::FlightAware;

/// Keys every flight object must carry. A response missing one is not
/// something we understand, so the run aborts.
const REQUIRED: &[&str] = &[
  "operator_icao",
  "flight_number",
  "ident_icao",
  "origin",
  "destination",
  "diverted",
  "cancelled",
  "status",
  "fa_flight_id",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
  Arrivals,
  ScheduledArrivals,
}

impl Feed {
  /// Both the URL segment and the key of the flight array in the response.
  pub fn name(self) -> &'static str {
    match self {
      Feed::Arrivals => "arrivals",
      Feed::ScheduledArrivals => "scheduled_arrivals",
    }
  }
}

/// One decoded response page.
#[derive(Debug, Default)]
pub struct Page {
  pub flights: Vec<FlightFields>,
  pub skipped: usize,
  pub next:    Option<String>,
}

/// Decode one AeroAPI response body.
pub fn parse_page(feed: Feed, body: &Value) -> Result<Page> {
  let flights = body
    .get(feed.name())
    .and_then(Value::as_array)
    .ok_or_else(|| anyhow!("'{}' missing from response object", feed.name()))?;

  let mut page = Page {
    next: body
      .pointer("/links/next")
      .and_then(Value::as_str)
      .map(str::to_owned),
    ..Page::default()
  };

  for flight in flights {
    match convert(flight)? {
      Some(fields) => page.flights.push(fields),
      None => page.skipped += 1,
    }
  }
  Ok(page)
}

/// `Ok(None)` for flights that are deliberately not recorded.
fn convert(flight: &Value) -> Result<Option<FlightFields>> {
  for key in REQUIRED {
    if flight.get(key).is_none() {
      bail!("'{key}' missing from flight object");
    }
  }
  for key in ["code_icao", "code_iata"] {
    if flight["origin"].get(key).is_none() {
      bail!("'{key}' missing from origin object");
    }
  }
  if flight["destination"].get("code_icao").is_none() {
    bail!("'code_icao' missing from destination object");
  }

  let id = flight["fa_flight_id"].as_str().unwrap_or("<unknown>");
  if flight["diverted"].as_bool() == Some(true) {
    info!(fa_flight_id = id, "skipping flight marked as diverted");
    return Ok(None);
  }
  if flight["cancelled"].as_bool() == Some(true) {
    info!(fa_flight_id = id, "skipping flight marked as cancelled");
    return Ok(None);
  }
  let status = flight["status"].as_str().unwrap_or_default();
  if status.trim().eq_ignore_ascii_case("result unknown") {
    info!(fa_flight_id = id, "skipping flight with status 'Result unknown'");
    return Ok(None);
  }
  // Without an IATA code the ICAO code is often synthesized (PUJ as KPUJ).
  if flight["origin"]["code_iata"].is_null() {
    info!(fa_flight_id = id, "skipping flight whose origin code_iata is null");
    return Ok(None);
  }

  let text = |v: &Value| v.as_str().unwrap_or_default().to_owned();
  match FlightFields::new(
    &text(&flight["ident_icao"]),
    &text(&flight["operator_icao"]),
    &text(&flight["flight_number"]),
    &text(&flight["origin"]["code_icao"]),
    &text(&flight["destination"]["code_icao"]),
  ) {
    Ok(fields) => Ok(Some(fields)),
    Err(e) => {
      warn!(fa_flight_id = id, error = %e, "skipping flight with unusable fields");
      Ok(None)
    }
  }
}

// ─── Pager ───────────────────────────────────────────────────────────────────

pub struct AeroApi<'a> {
  client:   &'a Client,
  settings: &'a FlightAware,
}

impl<'a> AeroApi<'a> {
  pub fn new(client: &'a Client, settings: &'a FlightAware) -> Self { Self { client, settings } }

  fn base(&self) -> &str { self.settings.base_url.trim_end_matches('/') }

  fn first_url(&self, airport: &str, feed: Feed) -> String {
    format!(
      "{}/airports/{airport}/flights/{}?type=Airline&max_pages={}",
      self.base(),
      feed.name(),
      self.settings.max_pages
    )
  }

  fn next_url(&self, next: &str) -> String {
    format!("{}/{}", self.base(), next.trim_start_matches('/'))
  }

  /// Every recordable flight from both feeds for `airport`.
  pub async fn arrivals(&self, airport: &str) -> Result<Vec<FlightFields>> {
    let mut flights = self.collect(airport, Feed::Arrivals).await?;
    info!(count = flights.len(), "done processing arrival data");

    self.pause("prior to getting scheduled arrivals").await;

    let scheduled = self.collect(airport, Feed::ScheduledArrivals).await?;
    info!(count = scheduled.len(), "done processing scheduled arrival data");
    flights.extend(scheduled);
    Ok(flights)
  }

  async fn collect(&self, airport: &str, feed: Feed) -> Result<Vec<FlightFields>> {
    let depth_limit = self.settings.page_depth.max(1);
    let mut url = self.first_url(airport, feed);
    let mut flights = Vec::new();

    for depth in 1..=depth_limit {
      info!(feed = feed.name(), depth, "requesting data from FlightAware");
      let body = self.get(&url).await?;
      let page = parse_page(feed, &body).with_context(|| format!("decoding {} page {depth}", feed.name()))?;
      debug!(kept = page.flights.len(), skipped = page.skipped, "page decoded");
      flights.extend(page.flights);

      if depth == depth_limit {
        break;
      }
      let Some(next) = page.next else {
        info!(feed = feed.name(), depth, "no further pages");
        break;
      };
      self.pause("prior to getting next page depth").await;
      url = self.next_url(&next);
    }
    Ok(flights)
  }

  async fn get(&self, url: &str) -> Result<Value> {
    loop {
      let resp = self
        .client
        .get(url)
        .header("x-apikey", &self.settings.api_key)
        .header(header::ACCEPT, "application/json; charset=UTF-8")
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?;

      match resp.status() {
        StatusCode::OK => return resp.json().await.context("decoding FlightAware response"),
        StatusCode::TOO_MANY_REQUESTS => {
          info!(
            seconds = self.settings.sleep.as_secs(),
            "FlightAware returned 429; will retry"
          );
          tokio::time::sleep(self.settings.sleep).await;
        }
        status => {
          let body = resp.text().await.unwrap_or_default();
          debug!(%status, body = %body, "unexpected FlightAware response");
          bail!("response code from FlightAware was {status}");
        }
      }
    }
  }

  async fn pause(&self, why: &str) {
    info!("sleeping {} seconds {why}", self.settings.sleep.as_secs());
    tokio::time::sleep(self.settings.sleep).await;
  }
}
