//! Source adapters: turn a source extract into normalized candidates.
//!
//! Adapters are pure functions over bytes or JSON values so they can be
//! tested on fixtures; fetching lives in [`crate::client`] and the
//! FlightAware pager.

pub mod airports;
pub mod flightaware;
pub mod operators;
pub mod registrations;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Parse a JSON array extract, then convert every element with `convert`.
/// The first bad record aborts the run, naming its position.
pub(crate) fn parse_array<R, T>(
  bytes: &[u8],
  what: &str,
  mut convert: impl FnMut(R) -> aerodex_core::Result<T>,
) -> Result<Vec<T>>
where
  R: DeserializeOwned,
{
  let raw: Vec<R> =
    serde_json::from_slice(bytes).with_context(|| format!("{what} extract is not a JSON array"))?;
  raw
    .into_iter()
    .enumerate()
    .map(|(i, r)| convert(r).with_context(|| format!("{what} record {i} is invalid")))
    .collect()
}
