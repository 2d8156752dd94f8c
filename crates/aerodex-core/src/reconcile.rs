//! The reconciliation planner.
//!
//! Given every row one source currently owns in a table and a fresh batch of
//! candidates from that source, [`plan`] works out the minimal set of row
//! operations that leaves the source's live rows equal to the batch:
//!
//! - **deregister** live rows whose key is absent from the batch,
//! - **obsolete** live rows whose key is present but whose hash differs,
//! - **revive** deleted rows whose `(key, hash)` reappears,
//! - **create** rows for `(key, hash)` pairs never seen before.
//!
//! The planner is pure; the store applies a plan inside one transaction.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
  ContentHash, Result,
  operator::OperatorFields,
  registration::{DataType, RegistrationPayload},
};

/// One normalized record offered by a source, with its natural key and the
/// hash of its canonical field set.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<P> {
  pub key:     String,
  pub payload: P,
  pub hash:    ContentHash,
}

impl<P: Serialize> Candidate<P> {
  pub fn new(key: impl Into<String>, payload: P) -> Result<Self> {
    let hash = ContentHash::of(&payload)?;
    Ok(Self { key: key.into(), payload, hash })
  }
}

impl Candidate<RegistrationPayload> {
  pub fn registration(payload: RegistrationPayload) -> Result<Self> {
    Self::new(payload.icao_hex.clone(), payload)
  }
}

impl Candidate<OperatorFields> {
  pub fn operator(fields: OperatorFields) -> Result<Self> {
    Self::new(fields.airline_designator.clone(), fields)
  }
}

/// The planner's view of a stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRow {
  pub unique_id: i64,
  pub key:       String,
  pub hash:      ContentHash,
  pub deleted:   bool,
}

/// How much of the source's table the batch speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  /// The batch is the source's complete data set; missing keys are
  /// deregistered.
  Full,
  /// The batch only speaks for its own keys (single-record API writes).
  Keys,
}

#[derive(Debug)]
pub struct ReconcilePlan<P> {
  pub deregister: Vec<i64>,
  pub obsolete:   Vec<i64>,
  pub revive:     Vec<i64>,
  pub create:     Vec<Candidate<P>>,
  pub untouched:  usize,
  pub staged:     usize,
  pub duplicates: usize,
}

impl<P> ReconcilePlan<P> {
  /// True when applying the plan would change nothing.
  pub fn is_noop(&self) -> bool {
    self.deregister.is_empty()
      && self.obsolete.is_empty()
      && self.revive.is_empty()
      && self.create.is_empty()
  }

  pub fn report(&self) -> ReconcileReport {
    ReconcileReport {
      staged:       self.staged,
      duplicates:   self.duplicates,
      deregistered: self.deregister.len(),
      obsoleted:    self.obsolete.len(),
      created:      self.create.len(),
      revived:      self.revive.len(),
      untouched:    self.untouched,
    }
  }
}

/// Counts describing one applied reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
  pub staged:       usize,
  pub duplicates:   usize,
  pub deregistered: usize,
  pub obsoleted:    usize,
  pub created:      usize,
  pub revived:      usize,
  pub untouched:    usize,
}

/// Counts describing one flight TTL refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRefreshReport {
  pub staged:   usize,
  pub created:  usize,
  pub extended: usize,
}

/// A full batch from one source, for one table.
#[derive(Debug)]
pub enum ImportBatch {
  Registrations {
    data_type: DataType,
    records:   Vec<Candidate<RegistrationPayload>>,
  },
  Operators(Vec<Candidate<OperatorFields>>),
}

impl ImportBatch {
  pub fn len(&self) -> usize {
    match self {
      ImportBatch::Registrations { records, .. } => records.len(),
      ImportBatch::Operators(records) => records.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Plan the reconciliation of `existing` (rows owned by one source) against
/// `batch`. When a key occurs more than once in the batch the last
/// occurrence wins.
pub fn plan<P>(existing: &[ExistingRow], batch: Vec<Candidate<P>>, scope: Scope) -> ReconcilePlan<P> {
  let offered = batch.len();
  let mut staged: BTreeMap<String, Candidate<P>> = BTreeMap::new();
  for candidate in batch {
    staged.insert(candidate.key.clone(), candidate);
  }

  let mut by_key: HashMap<&str, Vec<&ExistingRow>> = HashMap::new();
  for row in existing {
    by_key.entry(row.key.as_str()).or_default().push(row);
  }

  let mut deregister = Vec::new();
  let mut obsolete = Vec::new();
  for row in existing.iter().filter(|r| !r.deleted) {
    match staged.get(&row.key) {
      None if scope == Scope::Full => deregister.push(row.unique_id),
      None => {}
      Some(candidate) if candidate.hash != row.hash => obsolete.push(row.unique_id),
      Some(_) => {}
    }
  }

  let mut revive = Vec::new();
  let mut create = Vec::new();
  let mut untouched = 0;
  let staged_count = staged.len();
  for (key, candidate) in staged {
    let matching = by_key
      .get(key.as_str())
      .and_then(|rows| rows.iter().find(|r| r.hash == candidate.hash));
    match matching {
      Some(row) if row.deleted => revive.push(row.unique_id),
      Some(_) => untouched += 1,
      None => create.push(candidate),
    }
  }

  ReconcilePlan {
    deregister,
    obsolete,
    revive,
    create,
    untouched,
    staged: staged_count,
    duplicates: offered - staged_count,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn cand(key: &str, value: i64) -> Candidate<serde_json::Value> {
    Candidate::new(key, json!({ "key": key, "value": value })).unwrap()
  }

  fn row(id: i64, c: &Candidate<serde_json::Value>, deleted: bool) -> ExistingRow {
    ExistingRow { unique_id: id, key: c.key.clone(), hash: c.hash.clone(), deleted }
  }

  /// Apply a plan to an in-memory table the way the store does.
  fn apply(rows: &mut Vec<ExistingRow>, plan: ReconcilePlan<serde_json::Value>) {
    for r in rows.iter_mut() {
      if plan.deregister.contains(&r.unique_id) || plan.obsolete.contains(&r.unique_id) {
        r.deleted = true;
      }
      if plan.revive.contains(&r.unique_id) {
        r.deleted = false;
      }
    }
    let mut next = rows.iter().map(|r| r.unique_id).max().unwrap_or(0);
    for c in plan.create {
      next += 1;
      rows.push(row(next, &c, false));
    }
  }

  fn live_keys(rows: &[ExistingRow]) -> Vec<String> {
    let mut keys: Vec<_> = rows.iter().filter(|r| !r.deleted).map(|r| r.key.clone()).collect();
    keys.sort();
    keys
  }

  #[test]
  fn empty_table_creates_everything() {
    let p = plan(&[], vec![cand("A", 1), cand("B", 1)], Scope::Full);
    assert_eq!(p.create.len(), 2);
    assert_eq!(p.report().staged, 2);
  }

  #[test]
  fn live_rows_equal_batch_keys() {
    let mut rows = Vec::new();
    let first = plan(&rows, vec![cand("A", 1), cand("B", 1), cand("C", 1)], Scope::Full);
    apply(&mut rows, first);
    let second = plan(&rows, vec![cand("B", 2), cand("C", 1), cand("D", 1)], Scope::Full);
    apply(&mut rows, second);
    assert_eq!(live_keys(&rows), vec!["B", "C", "D"]);
  }

  #[test]
  fn changed_hash_obsoletes_and_creates() {
    let a1 = cand("A", 1);
    let rows = vec![row(1, &a1, false)];
    let p = plan(&rows, vec![cand("A", 2)], Scope::Full);
    assert_eq!(p.obsolete, vec![1]);
    assert_eq!(p.create.len(), 1);
    assert!(p.deregister.is_empty());
  }

  #[test]
  fn revival_keeps_the_original_row() {
    let mut rows = Vec::new();
    let first = plan(&rows, vec![cand("A", 1), cand("B", 1)], Scope::Full);
    apply(&mut rows, first);
    let id_a = rows.iter().find(|r| r.key == "A").unwrap().unique_id;

    let second = plan(&rows, vec![cand("B", 1)], Scope::Full);
    apply(&mut rows, second);
    assert_eq!(live_keys(&rows), vec!["B"]);

    let p = plan(&rows, vec![cand("A", 1), cand("B", 1)], Scope::Full);
    assert_eq!(p.revive, vec![id_a]);
    assert!(p.create.is_empty());
    apply(&mut rows, p);
    assert_eq!(rows.iter().filter(|r| r.key == "A").count(), 1);
  }

  #[test]
  fn rerunning_a_batch_is_a_noop() {
    let batch = || vec![cand("A", 1), cand("B", 1)];
    let mut rows = Vec::new();
    let first = plan(&rows, batch(), Scope::Full);
    apply(&mut rows, first);
    let p = plan(&rows, batch(), Scope::Full);
    assert!(p.is_noop());
    assert_eq!(p.report().untouched, 2);
  }

  #[test]
  fn key_scope_never_deregisters() {
    let a = cand("A", 1);
    let rows = vec![row(1, &a, false)];
    let p = plan(&rows, vec![cand("B", 1)], Scope::Keys);
    assert!(p.deregister.is_empty());
    assert_eq!(p.create.len(), 1);
  }

  #[test]
  fn last_duplicate_wins() {
    let p = plan(&[], vec![cand("A", 1), cand("A", 2)], Scope::Full);
    assert_eq!(p.duplicates, 1);
    assert_eq!(p.create.len(), 1);
    assert_eq!(p.create[0].hash, cand("A", 2).hash);
  }
}
