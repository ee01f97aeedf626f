//! The `CorpusStore` trait.
//!
//! The trait is implemented by storage backends (`MemoryStore` here,
//! `rival-store-sqlite`). The search engine, comparator, and the HTTP and CLI
//! surfaces depend on this abstraction, not on any concrete backend.
//!
//! Nothing in this crate writes to a store. A backend whose data can change
//! underneath a handle (another process rewriting the file) must hand out
//! stable views through [`CorpusStore::snapshot`]; every multi-read query
//! here runs against one.

use std::{
  collections::{HashMap, HashSet},
  future::Future,
};

use crate::{
  event::Event,
  person::{Country, Person},
  record::{BestRecords, RankKind},
};

/// Upper bound on the number of persons returned by a name search.
pub const FIND_LIMIT: usize = 100;

/// Read access to a results corpus.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes and from spawned tasks.
pub trait CorpusStore: Send + Sync + Sized {
  type Error: std::error::Error + Send + Sync + 'static;

  /// A view of the corpus that no later write can change.
  ///
  /// Reads through the returned store all see the data as it was when the
  /// snapshot was taken. Taking a snapshot of a snapshot returns the same
  /// view.
  fn snapshot(&self) -> impl Future<Output = Result<Self, Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Retrieve a person by exact id. Returns `None` if not found.
  fn get_person<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// Retrieve every person whose id is in `ids`; unknown ids are skipped.
  fn get_persons<'a>(
    &'a self,
    ids: &'a [String],
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Find persons by keyword.
  ///
  /// A case-insensitive exact id match is returned alone. Otherwise persons
  /// whose name contains `keyword` (case-insensitive) are returned, ordered by
  /// name, at most [`FIND_LIMIT`] of them.
  fn find_persons<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  // ── Records ───────────────────────────────────────────────────────────

  /// All single and average records for a person.
  fn get_best_records<'a>(
    &'a self,
    person_id: &'a str,
  ) -> impl Future<Output = Result<BestRecords, Self::Error>> + Send + 'a;

  /// Ids of every person whose `kind` record in `event_id` satisfies
  /// `0 < best < threshold`.
  ///
  /// This is the engine's hot path and must be served from an index on
  /// `(event, kind, best)`, not a scan.
  fn persons_below<'a>(
    &'a self,
    event_id: &'a str,
    kind: RankKind,
    threshold: i64,
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + 'a;

  // ── Reference data ────────────────────────────────────────────────────

  /// All events, ordered by display rank.
  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  fn get_country<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Country>, Self::Error>> + Send + 'a;

  /// Countries keyed by id; ids the store does not know are absent.
  fn get_countries<'a>(
    &'a self,
    ids: &'a [String],
  ) -> impl Future<Output = Result<HashMap<String, Country>, Self::Error>>
  + Send
  + 'a;
}
