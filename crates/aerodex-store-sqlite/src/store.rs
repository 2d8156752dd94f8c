//! [`SqliteStore`]: the SQLite implementation of [`AviationStore`].

use std::path::Path;

use aerodex_core::{
  airport::Airport,
  flight::{FlightFields, FlightKey, FlightRecord, NewFlight},
  operator::{NewOperator, OperatorFields, OperatorRecord},
  reconcile::{
    self, Candidate, ExistingRow, FlightRefreshReport, ImportBatch, ReconcilePlan,
    ReconcileReport, Scope,
  },
  registration::{DataType, LookupKey, RegistrationPayload, RegistrationRecord},
  source::Source,
  store::AviationStore,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;

use crate::{
  Result,
  encode::{
    AIRPORT_COLUMNS, RawFlight, RawOperator, RawRegistration, airport_from_row, encode_dt,
    hash_column, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An aerodex store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Reconciled tables ───────────────────────────────────────────────────────

/// A soft-deleted table reconciled by natural key.
#[derive(Debug, Clone, Copy)]
enum Table {
  SimpleRegistrations,
  DetailedRegistrations,
  Operators,
}

impl Table {
  fn registrations(data_type: DataType) -> Self {
    match data_type {
      DataType::Simple => Table::SimpleRegistrations,
      DataType::Detailed => Table::DetailedRegistrations,
    }
  }

  fn name(self) -> &'static str {
    match self {
      Table::SimpleRegistrations => "simple_registrations",
      Table::DetailedRegistrations => "detailed_registrations",
      Table::Operators => "operators",
    }
  }

  fn key_column(self) -> &'static str {
    match self {
      Table::SimpleRegistrations | Table::DetailedRegistrations => "icao_hex",
      Table::Operators => "airline_designator",
    }
  }
}

/// Resolve an agency to its source id, creating the source on first use.
fn source_id(conn: &Connection, agency: &str) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO sources (agency) VALUES (?1) ON CONFLICT (agency) DO NOTHING",
    params![agency],
  )?;
  conn.query_row("SELECT unique_id FROM sources WHERE agency = ?1", params![agency], |r| r.get(0))
}

/// Every row `source` owns in `table`, optionally for one key only.
fn existing_rows(
  conn: &Connection,
  table: Table,
  source: i64,
  only_key: Option<&str>,
) -> rusqlite::Result<Vec<ExistingRow>> {
  let sql = format!(
    "SELECT unique_id, {key}, hash, deleted IS NOT NULL FROM {table}
     WHERE source = ?1 AND (?2 IS NULL OR {key} = ?2)",
    key = table.key_column(),
    table = table.name(),
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params![source, only_key], |r| {
      Ok(ExistingRow {
        unique_id: r.get(0)?,
        key:       r.get(1)?,
        hash:      hash_column(r, 2)?,
        deleted:   r.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Apply a plan produced for `table`. `insert` writes one created row.
fn apply_plan<P>(
  conn: &Connection,
  table: Table,
  plan: &ReconcilePlan<P>,
  now: &str,
  mut insert: impl FnMut(&Candidate<P>) -> rusqlite::Result<usize>,
) -> rusqlite::Result<ReconcileReport> {
  let mut retire = conn.prepare_cached(&format!(
    "UPDATE {} SET deleted = ?1 WHERE unique_id = ?2 AND deleted IS NULL",
    table.name()
  ))?;
  for id in plan.deregister.iter().chain(&plan.obsolete) {
    retire.execute(params![now, id])?;
  }

  let mut revive =
    conn.prepare_cached(&format!("UPDATE {} SET deleted = NULL WHERE unique_id = ?1", table.name()))?;
  for id in &plan.revive {
    revive.execute(params![id])?;
  }

  for candidate in &plan.create {
    insert(candidate)?;
  }
  Ok(plan.report())
}

fn insert_registration(
  conn: &Connection,
  table: Table,
  source: i64,
  candidate: &Candidate<RegistrationPayload>,
) -> rusqlite::Result<usize> {
  let payload = &candidate.payload;
  conn
    .prepare_cached(&format!(
      "INSERT INTO {} (icao_hex, registration, data, hash, source) VALUES (?1, ?2, ?3, ?4, ?5)",
      table.name()
    ))?
    .execute(params![
      payload.icao_hex,
      payload.registration,
      payload.data.to_string(),
      candidate.hash.as_str(),
      source,
    ])
}

fn insert_operator(
  conn: &Connection,
  source: i64,
  candidate: &Candidate<OperatorFields>,
) -> rusqlite::Result<usize> {
  let fields = &candidate.payload;
  conn
    .prepare_cached(
      "INSERT INTO operators (airline_designator, name, callsign, country, hash, source)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?
    .execute(params![
      fields.airline_designator,
      fields.name,
      fields.callsign,
      fields.country,
      candidate.hash.as_str(),
      source,
    ])
}

/// Plan and apply one operator batch for `source`.
fn reconcile_operators(
  conn: &Connection,
  source: i64,
  records: Vec<Candidate<OperatorFields>>,
  scope: Scope,
  only_key: Option<&str>,
  now: &str,
) -> rusqlite::Result<ReconcileReport> {
  let existing = existing_rows(conn, Table::Operators, source, only_key)?;
  let plan = reconcile::plan(&existing, records, scope);
  apply_plan(conn, Table::Operators, &plan, now, |c| insert_operator(conn, source, c))
}

// ─── AviationStore impl ──────────────────────────────────────────────────────

impl AviationStore for SqliteStore {
  type Error = crate::Error;

  async fn health(&self) -> Result<String> {
    let version = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT sqlite_version()", [], |r| r.get::<_, String>(0))?))
      .await?;
    Ok(format!("SQLite {version}"))
  }

  async fn ensure_source(&self, agency: &str) -> Result<Source> {
    let agency = agency.to_owned();
    let source = self
      .conn
      .call(move |conn| {
        let unique_id = source_id(conn, &agency)?;
        Ok(Source { unique_id, agency })
      })
      .await?;
    Ok(source)
  }

  // ── Registrations ─────────────────────────────────────────────────────────

  async fn find_registrations(
    &self,
    data_type: DataType,
    key: &LookupKey,
  ) -> Result<Vec<RegistrationRecord>> {
    let sql = format!(
      "SELECT {columns} FROM {table} r JOIN sources s ON s.unique_id = r.source
       WHERE r.{column} = ?1 AND r.deleted IS NULL
       ORDER BY r.unique_id",
      columns = RawRegistration::COLUMNS,
      table = Table::registrations(data_type).name(),
      column = key.column().as_str(),
    );
    let value = key.value().to_owned();

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![value], RawRegistration::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRegistration::into_record).collect()
  }

  async fn reconcile(&self, agency: String, batch: ImportBatch) -> Result<ReconcileReport> {
    let now = now();
    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let source = source_id(&tx, &agency)?;
        let report = match batch {
          ImportBatch::Registrations { data_type, records } => {
            let table = Table::registrations(data_type);
            let existing = existing_rows(&tx, table, source, None)?;
            let plan = reconcile::plan(&existing, records, Scope::Full);
            apply_plan(&tx, table, &plan, &now, |c| insert_registration(&tx, table, source, c))?
          }
          ImportBatch::Operators(records) => {
            reconcile_operators(&tx, source, records, Scope::Full, None, &now)?
          }
        };
        tx.commit()?;
        Ok(report)
      })
      .await?;
    debug!(?report, "reconciliation committed");
    Ok(report)
  }

  // ── Operators ─────────────────────────────────────────────────────────────

  async fn find_operators(&self, designator: &str) -> Result<Vec<OperatorRecord>> {
    let designator = designator.to_owned();
    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM operators o JOIN sources s ON s.unique_id = o.source
           WHERE o.airline_designator = ?1 AND o.deleted IS NULL
           ORDER BY o.unique_id",
          RawOperator::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![designator], RawOperator::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOperator::into_record).collect()
  }

  async fn write_operator(&self, operator: NewOperator) -> Result<ReconcileReport> {
    let candidate = Candidate::operator(operator.fields)?;
    let agency = operator.source;
    let now = now();

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let source = source_id(&tx, &agency)?;
        let key = candidate.key.clone();
        let mut report =
          reconcile_operators(&tx, source, vec![candidate], Scope::Keys, Some(&key), &now)?;
        // Last writer wins: one live row per designator across sources.
        report.obsoleted += tx.execute(
          "UPDATE operators SET deleted = ?1
           WHERE airline_designator = ?2 AND source != ?3 AND deleted IS NULL",
          params![now, key, source],
        )?;
        tx.commit()?;
        Ok(report)
      })
      .await?;
    Ok(report)
  }

  async fn delete_operator(&self, designator: &str) -> Result<usize> {
    let designator = designator.to_owned();
    let now = now();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE operators SET deleted = ?1 WHERE airline_designator = ?2 AND deleted IS NULL",
          params![now, designator],
        )?)
      })
      .await?;
    Ok(changed)
  }

  // ── Flights ───────────────────────────────────────────────────────────────

  async fn find_flights(
    &self,
    ident: &str,
    focus_airport: Option<&str>,
  ) -> Result<Vec<FlightRecord>> {
    let ident = ident.to_owned();
    let focus = focus_airport.map(str::to_owned);
    let now = now();

    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM flight_numbers f JOIN sources s ON s.unique_id = f.source
           WHERE f.ident = ?1 AND f.expires > ?2
             AND (?3 IS NULL OR f.origin = ?3 OR f.destination = ?3)
           ORDER BY f.unique_id",
          RawFlight::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![ident, now, focus], RawFlight::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFlight::into_record).collect()
  }

  async fn conflicting_flights(&self) -> Result<Vec<FlightRecord>> {
    let now = now();
    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM flight_numbers f JOIN sources s ON s.unique_id = f.source
           WHERE f.expires > ?1
             AND f.ident IN (
               SELECT ident FROM flight_numbers WHERE expires > ?1
               GROUP BY ident HAVING COUNT(*) > 1
             )
           ORDER BY f.ident, f.unique_id",
          RawFlight::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![now], RawFlight::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFlight::into_record).collect()
  }

  async fn upsert_flight(&self, flight: NewFlight) -> Result<bool> {
    let hash = flight.fields.content_hash()?;
    let expires = encode_dt(flight.expires);

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let source = source_id(&tx, &flight.source)?;
        let f = &flight.fields;
        let changed = tx.execute(
          "INSERT INTO flight_numbers
             (ident, airline_designator, flight_number, origin, destination, expires, hash, source)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (ident, origin, destination) DO UPDATE SET
             airline_designator = excluded.airline_designator,
             flight_number      = excluded.flight_number,
             expires            = excluded.expires,
             hash               = excluded.hash,
             source             = excluded.source
           WHERE flight_numbers.hash    != excluded.hash
              OR flight_numbers.source  != excluded.source
              OR flight_numbers.expires != excluded.expires",
          params![
            f.ident,
            f.airline_designator,
            f.flight_number,
            f.origin,
            f.destination,
            expires,
            hash.as_str(),
            source,
          ],
        )?;
        tx.commit()?;
        Ok(changed)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn expire_flight(&self, key: &FlightKey) -> Result<usize> {
    let key = key.clone();
    let now = now();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE flight_numbers SET expires = ?4
           WHERE ident = ?1 AND origin = ?2 AND destination = ?3 AND expires > ?4",
          params![key.ident, key.origin, key.destination, now],
        )?)
      })
      .await?;
    Ok(changed)
  }

  async fn refresh_flights(
    &self,
    agency: String,
    flights: Vec<FlightFields>,
    expires: DateTime<Utc>,
  ) -> Result<FlightRefreshReport> {
    let rows = flights
      .into_iter()
      .map(|f| -> Result<_> { Ok((f.content_hash()?, f)) })
      .collect::<Result<Vec<_>>>()?;
    let expires = encode_dt(expires);

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let source = source_id(&tx, &agency)?;
        let mut report = FlightRefreshReport { staged: rows.len(), ..Default::default() };
        {
          let mut find = tx.prepare_cached(
            "SELECT unique_id FROM flight_numbers
             WHERE ident = ?1 AND origin = ?2 AND destination = ?3",
          )?;
          let mut extend = tx.prepare_cached(
            "UPDATE flight_numbers SET
               airline_designator = ?2, flight_number = ?3, hash = ?4, source = ?5,
               expires = MAX(expires, ?6)
             WHERE unique_id = ?1",
          )?;
          let mut insert = tx.prepare_cached(
            "INSERT INTO flight_numbers
               (ident, airline_designator, flight_number, origin, destination, expires, hash, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;
          for (hash, f) in &rows {
            let existing: Option<i64> = find
              .query_row(params![f.ident, f.origin, f.destination], |r| r.get(0))
              .optional()?;
            match existing {
              Some(id) => {
                extend.execute(params![
                  id,
                  f.airline_designator,
                  f.flight_number,
                  hash.as_str(),
                  source,
                  expires,
                ])?;
                report.extended += 1;
              }
              None => {
                insert.execute(params![
                  f.ident,
                  f.airline_designator,
                  f.flight_number,
                  f.origin,
                  f.destination,
                  expires,
                  hash.as_str(),
                  source,
                ])?;
                report.created += 1;
              }
            }
          }
        }
        tx.commit()?;
        Ok(report)
      })
      .await?;
    Ok(report)
  }

  // ── Airports ──────────────────────────────────────────────────────────────

  async fn replace_airports(&self, agency: String, airports: Vec<Airport>) -> Result<usize> {
    let loaded = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let source = source_id(&tx, &agency)?;
        tx.execute("DELETE FROM airports", [])?;
        {
          let mut insert = tx.prepare_cached(
            "INSERT INTO airports
               (icao_code, iata_code, name, city, region, country, phonic, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (icao_code) DO UPDATE SET
               iata_code = excluded.iata_code, name = excluded.name,
               city = excluded.city, region = excluded.region,
               country = excluded.country, phonic = excluded.phonic",
          )?;
          for a in &airports {
            insert.execute(params![
              a.icao_code,
              a.iata_code,
              a.name,
              a.city,
              a.region,
              a.country,
              a.phonic,
              source,
            ])?;
          }
        }
        // Duplicate codes collapse into one row, so count what is stored.
        let loaded = tx.query_row("SELECT COUNT(*) FROM airports", [], |r| r.get::<_, i64>(0))?;
        tx.commit()?;
        Ok(usize::try_from(loaded).unwrap_or_default())
      })
      .await?;
    Ok(loaded)
  }

  async fn get_airport(&self, icao_code: &str) -> Result<Option<Airport>> {
    let icao_code = icao_code.to_owned();
    let airport = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {AIRPORT_COLUMNS} FROM airports WHERE icao_code = ?1"),
              params![icao_code],
              airport_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(airport)
  }
}
