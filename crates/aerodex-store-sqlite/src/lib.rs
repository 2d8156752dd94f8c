//! SQLite backend for the aerodex aviation store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every statement is parameterized.

mod encode;
mod schema;
mod store;

pub mod config;
pub mod error;

pub use config::DatabaseConfig;
pub use error::{Error, Result};
pub use store::SqliteStore;
