//! Source: the agency a record was imported from or posted on behalf of.

use serde::{Deserialize, Serialize};

/// A data source. Unique per agency name; created lazily on the first write
/// from a new agency and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
  pub unique_id: i64,
  pub agency:    String,
}
