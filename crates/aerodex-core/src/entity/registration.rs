use tracing::warn;

use super::exactly_one;
use crate::{
  Error, Result,
  registration::{DataType, LookupKey, RegistrationRecord},
  store::AviationStore,
};

/// Fetch the single live registration for `key` from the `data_type` table.
pub async fn get<S: AviationStore>(
  store: &S,
  data_type: DataType,
  key: &LookupKey,
) -> Result<RegistrationRecord> {
  let rows = store.find_registrations(data_type, key).await.map_err(Error::store)?;
  exactly_one(rows).inspect_err(|e| {
    if let Error::UnexpectedResult { found, .. } = e {
      warn!(
        table = %data_type,
        column = key.column().as_str(),
        value = key.value(),
        found,
        "multiple live registrations"
      );
    }
  })
}
