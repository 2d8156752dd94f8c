//! Error types for `aerodex-core`.
//!
//! Every entity operation returns one of these instead of panicking or
//! leaking a backend error type; the API maps them to HTTP statuses in one
//! place.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The caller sent something unusable (bad path, missing field, …).
  #[error("{0}")]
  InvalidRequest(String),

  #[error("not found")]
  NotFound,

  /// The write would leave the resource exactly as it already is.
  #[error("resource is already in the requested state")]
  NotModified,

  /// The store returned a row count that should be impossible.
  #[error("expected {expected} matching rows, found {found}")]
  UnexpectedResult { expected: &'static str, found: usize },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }

  pub fn invalid(message: impl Into<String>) -> Self {
    Error::InvalidRequest(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
