//! A person's personal records, with rank badges.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  event::{FormatTag, short_code},
  person::Person,
  record::{RankKind, RankRecord},
  result::Outcome,
  store::CorpusStore,
};

/// Ranks above this are not badged.
pub const BADGE_CUTOFF: u32 = 200;

/// The most prestigious rank within [`BADGE_CUTOFF`]; world beats continent
/// beats country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "rank", rename_all = "lowercase")]
pub enum Badge {
  World(u32),
  Continent(u32),
  Country(u32),
}

impl Badge {
  pub fn for_record(record: &RankRecord) -> Option<Self> {
    let within = |rank: Option<u32>| rank.filter(|r| *r <= BADGE_CUTOFF);
    within(record.world_rank)
      .map(Self::World)
      .or_else(|| within(record.continent_rank).map(Self::Continent))
      .or_else(|| within(record.country_rank).map(Self::Country))
  }
}

impl fmt::Display for Badge {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::World(r) => write!(f, "WR{r}"),
      Self::Continent(r) => write!(f, "CR{r}"),
      Self::Country(r) => write!(f, "NR{r}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedOutcome {
  pub outcome: Outcome,
  pub badge:   Option<Badge>,
}

impl fmt::Display for RankedOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.outcome)?;
    if let Some(badge) = self.badge {
      write!(f, " ({badge})")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
  pub event_id: String,
  pub single:   Option<RankedOutcome>,
  pub average:  Option<RankedOutcome>,
}

impl RecordEntry {
  /// `333  5.00 (WR12) || 6.50`
  pub fn line(&self) -> String {
    let show = |r: &Option<RankedOutcome>| {
      r.as_ref().map_or_else(|| "-".to_owned(), ToString::to_string)
    };
    format!(
      "{}  {} || {}",
      short_code(&self.event_id),
      show(&self.single),
      show(&self.average)
    )
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub person:  Person,
  pub entries: Vec<RecordEntry>,
}

/// Collect a person's records in event display order.
///
/// Events where neither metric shows anything are left out; a DNF still
/// shows.
pub async fn profile<S: CorpusStore>(store: &S, person_id: &str) -> Result<Profile> {
  let store = &store.snapshot().await.map_err(Error::store)?;
  let person = store
    .get_person(person_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(person_id.to_owned()))?;
  let records = store
    .get_best_records(&person.id)
    .await
    .map_err(Error::store)?;
  let events = store.list_events().await.map_err(Error::store)?;

  let ranked = |kind: RankKind, event_id: &str, format| {
    records.get(kind, event_id).map(|r| RankedOutcome {
      outcome: r.outcome(format),
      badge:   Badge::for_record(r),
    })
  };

  let mut entries = Vec::new();
  let known = events.iter().map(|e| (e.id.as_str(), e.format));
  let unknown = records
    .event_ids()
    .filter(|id| !events.iter().any(|e| e.id == *id))
    .map(|id| (id, FormatTag::default()));
  for (event_id, format) in known.chain(unknown) {
    let single = ranked(RankKind::Single, event_id, format);
    let average = ranked(RankKind::Average, event_id, format);
    let shows = |r: &Option<RankedOutcome>| {
      r.as_ref().is_some_and(|r| r.outcome != Outcome::Unset)
    };
    if !shows(&single) && !shows(&average) {
      continue;
    }
    entries.push(RecordEntry { event_id: event_id.to_owned(), single, average });
  }

  Ok(Profile { person, entries })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{event::Event, memory::MemoryStore};

  fn ranked(best: i64, world: u32, continent: u32, country: u32) -> RankRecord {
    RankRecord {
      world_rank: Some(world),
      continent_rank: Some(continent),
      country_rank: Some(country),
      ..RankRecord::new("P", "333", best)
    }
  }

  #[test]
  fn badge_prefers_world_then_continent_then_country() {
    assert_eq!(Badge::for_record(&ranked(1, 12, 3, 1)), Some(Badge::World(12)));
    assert_eq!(Badge::for_record(&ranked(1, 900, 150, 9)), Some(Badge::Continent(150)));
    assert_eq!(Badge::for_record(&ranked(1, 900, 400, 200)), Some(Badge::Country(200)));
    assert_eq!(Badge::for_record(&ranked(1, 900, 400, 201)), None);
    assert_eq!(Badge::for_record(&RankRecord::new("P", "333", 1)), None);
  }

  #[tokio::test]
  async fn profile_lists_events_in_rank_order() {
    let store = MemoryStore::builder()
      .person(Person { id: "P".into(), name: "Pat".into(), country_id: None })
      .event(Event { id: "pyram".into(), name: "Pyraminx".into(), format: FormatTag::Time, rank: 2 })
      .event(Event { id: "333".into(), name: "3x3x3".into(), format: FormatTag::Time, rank: 1 })
      .event(Event { id: "444".into(), name: "4x4x4".into(), format: FormatTag::Time, rank: 3 })
      .record(RankKind::Single, ranked(512, 12, 3, 1))
      .record(RankKind::Average, RankRecord::new("P", "333", 650))
      .record(RankKind::Single, RankRecord::new("P", "pyram", -1))
      .record(RankKind::Single, RankRecord::new("P", "444", 0))
      .build();

    let profile = profile(&store, "P").await.unwrap();
    let lines: Vec<_> = profile.entries.iter().map(RecordEntry::line).collect();
    assert_eq!(lines, ["333  5.12 (WR12) || 6.50", "py  DNF || -"]);
  }

  #[tokio::test]
  async fn profile_of_unknown_person_is_not_found() {
    let store = MemoryStore::default();
    assert!(matches!(
      profile(&store, "nobody").await,
      Err(Error::NotFound(_))
    ));
  }
}
