//! Mapping between SQLite rows and `rival-core` types.
//!
//! Rank columns store `0` for "unranked"; `best` is the raw encoded result
//! and is never decoded here.

use rival_core::{
  event::{Event, FormatTag},
  person::{Country, Person},
  record::{RankKind, RankRecord, rank_from_raw},
};
use rusqlite::Row;

// ─── Table names ─────────────────────────────────────────────────────────────

pub fn ranks_table(kind: RankKind) -> &'static str {
  match kind {
    RankKind::Single => "ranks_single",
    RankKind::Average => "ranks_average",
  }
}

// ─── Ranks ───────────────────────────────────────────────────────────────────

pub fn encode_rank(rank: Option<u32>) -> i64 { rank.map_or(0, i64::from) }

pub const RANK_COLUMNS: &str =
  "person_id, event_id, best, world_rank, continent_rank, country_rank";

pub fn rank_from_row(row: &Row<'_>) -> rusqlite::Result<RankRecord> {
  Ok(RankRecord {
    person_id:      row.get(0)?,
    event_id:       row.get(1)?,
    best:           row.get(2)?,
    world_rank:     rank_from_raw(row.get(3)?),
    continent_rank: rank_from_raw(row.get(4)?),
    country_rank:   rank_from_raw(row.get(5)?),
  })
}

// ─── Reference data ──────────────────────────────────────────────────────────

pub const PERSON_COLUMNS: &str = "id, name, country_id";

pub fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
  Ok(Person {
    id:         row.get(0)?,
    name:       row.get(1)?,
    country_id: row.get(2)?,
  })
}

pub const COUNTRY_COLUMNS: &str = "id, continent_id, iso2";

pub fn country_from_row(row: &Row<'_>) -> rusqlite::Result<Country> {
  Ok(Country {
    id:           row.get(0)?,
    continent_id: row.get(1)?,
    iso2:         row.get(2)?,
  })
}

/// Events are read in display order; see [`EVENT_ORDER`].
pub const EVENT_COLUMNS: &str = "id, name, format, rank";

pub const EVENT_ORDER: &str = "ORDER BY rank, id";

pub fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
  let format: String = row.get(2)?;
  Ok(Event {
    id:     row.get(0)?,
    name:   row.get(1)?,
    format: FormatTag::from_export(&format),
    rank:   row.get(3)?,
  })
}

/// `?1, ?2, ... ?n` for an `IN (...)` list.
pub fn placeholders(n: usize) -> String {
  (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn placeholders_are_numbered() {
    assert_eq!(placeholders(3), "?1, ?2, ?3");
    assert_eq!(placeholders(0), "");
  }

  #[test]
  fn unranked_is_stored_as_zero() {
    assert_eq!(encode_rank(None), 0);
    assert_eq!(encode_rank(Some(17)), 17);
    assert_eq!(rank_from_raw(encode_rank(None)), None);
  }
}
