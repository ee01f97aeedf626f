//! SQLite backend for the Rival results corpus.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`import`] loads a results export
//! (tab-separated files) into a store.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod import;

pub use error::{Error, Result};
pub use store::{Dataset, SqliteStore, TableCounts};
