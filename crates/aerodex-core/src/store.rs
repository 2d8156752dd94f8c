//! The `AviationStore` trait.
//!
//! Implemented by storage backends (e.g. `aerodex-store-sqlite`). The API
//! server and the importers depend on this abstraction, not on a concrete
//! backend. Every mutating method runs in a single backend transaction and
//! only touches rows attributed to the writing source.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  airport::Airport,
  flight::{FlightFields, FlightKey, FlightRecord, NewFlight},
  operator::{NewOperator, OperatorRecord},
  reconcile::{FlightRefreshReport, ImportBatch, ReconcileReport},
  registration::{DataType, LookupKey, RegistrationRecord},
  source::Source,
};

/// Abstraction over an aerodex store backend.
///
/// Methods return `Send` futures so the trait can be used from axum handlers
/// on a multi-threaded runtime.
pub trait AviationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Housekeeping ──────────────────────────────────────────────────────

  /// Check the backend is reachable; returns its engine version string.
  fn health(&self) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Look up a source by agency name, creating it on first use.
  fn ensure_source<'a>(
    &'a self,
    agency: &'a str,
  ) -> impl Future<Output = Result<Source, Self::Error>> + Send + 'a;

  // ── Registrations ─────────────────────────────────────────────────────

  /// All live rows in the `data_type` table matching `key`, across sources.
  fn find_registrations<'a>(
    &'a self,
    data_type: DataType,
    key: &'a LookupKey,
  ) -> impl Future<Output = Result<Vec<RegistrationRecord>, Self::Error>> + Send + 'a;

  /// Reconcile the source's rows in the batch's table against the batch.
  /// The batch is the source's complete data set.
  fn reconcile(
    &self,
    agency: String,
    batch: ImportBatch,
  ) -> impl Future<Output = Result<ReconcileReport, Self::Error>> + Send + '_;

  // ── Operators ─────────────────────────────────────────────────────────

  /// All live operator rows for a designator, across sources.
  fn find_operators<'a>(
    &'a self,
    designator: &'a str,
  ) -> impl Future<Output = Result<Vec<OperatorRecord>, Self::Error>> + Send + 'a;

  /// Reconcile a single operator for its source, without deregistering any
  /// other designator. Live rows other sources hold for the same designator
  /// are soft-deleted in the same transaction and counted as obsoleted.
  fn write_operator(
    &self,
    operator: NewOperator,
  ) -> impl Future<Output = Result<ReconcileReport, Self::Error>> + Send + '_;

  /// Soft-delete every live row for a designator, whatever its source.
  /// Returns the number of rows marked.
  fn delete_operator<'a>(
    &'a self,
    designator: &'a str,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Flights ───────────────────────────────────────────────────────────

  /// Live flight rows for `ident`, optionally restricted to rows whose
  /// origin or destination is `focus_airport`.
  fn find_flights<'a>(
    &'a self,
    ident: &'a str,
    focus_airport: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<FlightRecord>, Self::Error>> + Send + 'a;

  /// Every live row whose ident has more than one live row, ordered by
  /// ident.
  fn conflicting_flights(
    &self,
  ) -> impl Future<Output = Result<Vec<FlightRecord>, Self::Error>> + Send + '_;

  /// Insert or overwrite the row for the flight's key. Returns `false` when
  /// the stored row already had the same hash, source and expiry.
  fn upsert_flight(
    &self,
    flight: NewFlight,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Set `expires = now` on the live row for `key`. Returns rows affected.
  fn expire_flight<'a>(
    &'a self,
    key: &'a FlightKey,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Insert new rows and extend matching ones to `expires`, attributing them
  /// to `agency`.
  fn refresh_flights(
    &self,
    agency: String,
    flights: Vec<FlightFields>,
    expires: DateTime<Utc>,
  ) -> impl Future<Output = Result<FlightRefreshReport, Self::Error>> + Send + '_;

  // ── Airports ──────────────────────────────────────────────────────────

  /// Delete every airport and load `airports` in their place. Returns the
  /// number of rows loaded.
  fn replace_airports(
    &self,
    agency: String,
    airports: Vec<Airport>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn get_airport<'a>(
    &'a self,
    icao_code: &'a str,
  ) -> impl Future<Output = Result<Option<Airport>, Self::Error>> + Send + 'a;
}
