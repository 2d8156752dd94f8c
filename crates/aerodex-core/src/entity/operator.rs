use tracing::{info, warn};

use super::exactly_one;
use crate::{
  Error, Result,
  operator::{NewOperator, OperatorFields, designator_code},
  store::AviationStore,
};

pub async fn get<S: AviationStore>(store: &S, designator: &str) -> Result<OperatorFields> {
  let designator = designator_code(designator)?;
  let rows = store.find_operators(&designator).await.map_err(Error::store)?;
  let record = exactly_one(rows).inspect_err(|e| {
    if let Error::UnexpectedResult { found, .. } = e {
      warn!(%designator, found, "multiple live operators");
    }
  })?;
  Ok(record.fields)
}

/// Create or replace the operator for its source.
pub async fn post<S: AviationStore>(store: &S, operator: NewOperator) -> Result<()> {
  let designator = operator.fields.airline_designator.clone();
  let report = store.write_operator(operator).await.map_err(Error::store)?;
  if report.created + report.revived + report.obsoleted == 0 {
    return Err(Error::NotModified);
  }
  info!(%designator, ?report, "operator written");
  Ok(())
}

/// Like [`post`], but the designator must already have a live row.
pub async fn patch<S: AviationStore>(store: &S, operator: NewOperator) -> Result<()> {
  let existing = store
    .find_operators(&operator.fields.airline_designator)
    .await
    .map_err(Error::store)?;
  if existing.is_empty() {
    return Err(Error::NotFound);
  }
  post(store, operator).await
}

/// Retire every live row for the designator.
pub async fn delete<S: AviationStore>(store: &S, designator: &str) -> Result<()> {
  let designator = designator_code(designator)?;
  match store.delete_operator(&designator).await.map_err(Error::store)? {
    0 => Err(Error::NotFound),
    retired => {
      info!(%designator, retired, "operator deleted");
      Ok(())
    }
  }
}
