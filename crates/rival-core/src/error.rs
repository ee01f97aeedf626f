//! Error types for `rival-core`.

use thiserror::Error;

use crate::{person::Person, pk::Side};

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  NotFound(String),

  /// `side` is set when the keyword named one side of a comparison.
  #[error("{}{keyword:?} matches {} persons", side_prefix(side), candidates.len())]
  Ambiguous {
    side:       Option<Side>,
    keyword:    String,
    candidates: Vec<Person>,
  },

  #[error("{0} person not found: {1}")]
  PersonNotFound(Side, String),

  #[error("no comparable records")]
  NoComparableRecords,

  /// The corpus store failed; never retried here.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(err))
  }
}

fn side_prefix(side: &Option<Side>) -> String {
  side.map(|side| format!("{side} keyword ")).unwrap_or_default()
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
