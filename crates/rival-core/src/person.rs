//! Persons and countries.
//!
//! Both are reference data owned by the corpus store and immutable for the
//! lifetime of a snapshot.

use serde::{Deserialize, Serialize};

/// A competitor, identified by a stable structured id (e.g. `2009ZEMD01`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:         String,
  pub name:       String,
  pub country_id: Option<String>,
}

/// A country and the continent it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
  pub id:           String,
  /// Continent id as stored, e.g. `_Europe`. See [`crate::continent::normalize`].
  pub continent_id: String,
  pub iso2:         Option<String>,
}
