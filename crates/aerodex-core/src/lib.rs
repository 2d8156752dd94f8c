//! Core types and trait definitions for the aerodex aviation data store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The API server, the importers and the SQLite backend all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod airport;
pub mod code;
pub mod entity;
pub mod error;
pub mod flight;
pub mod hash;
pub mod operator;
pub mod reconcile;
pub mod registration;
pub mod source;
pub mod store;

pub use error::{Error, Result};
pub use hash::ContentHash;
