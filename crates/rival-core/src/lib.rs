//! Core types, the result codec, and the search and comparison engines for the
//! Rival results corpus.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::CorpusStore`]; everything else is written against that
//! trait.

pub mod continent;
pub mod error;
pub mod event;
pub mod memory;
pub mod nemesis;
pub mod person;
pub mod pk;
pub mod profile;
pub mod record;
pub mod resolve;
pub mod result;
pub mod store;

pub use error::{Error, Result};
