//! Resource entity operations.
//!
//! Each function validates its input, talks to an [`AviationStore`] and
//! returns a tagged [`Result`]: row counts that should be impossible become
//! [`Error::UnexpectedResult`], writes that change nothing become
//! [`Error::NotModified`]. Nothing here knows about HTTP.
//!
//! [`AviationStore`]: crate::store::AviationStore

pub mod flight;
pub mod operator;
pub mod registration;

use crate::{Error, Result};

/// Collapse a lookup result to its single row.
pub(crate) fn exactly_one<T>(mut rows: Vec<T>) -> Result<T> {
  match rows.len() {
    0 => Err(Error::NotFound),
    1 => Ok(rows.remove(0)),
    found => Err(Error::UnexpectedResult { expected: "at most one live row", found }),
  }
}
