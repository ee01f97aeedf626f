//! [`MemoryStore`], an immutable, in-memory [`CorpusStore`].
//!
//! Range queries are answered from per-event arrays sorted by result value,
//! so [`CorpusStore::persons_below`] costs two binary searches plus the size
//! of the answer. Cloning is cheap; every clone shares the same snapshot.

use std::{
  collections::{BTreeMap, HashMap, HashSet},
  convert::Infallible,
  sync::Arc,
};

use crate::{
  event::Event,
  person::{Country, Person},
  record::{BestRecords, RankKind, RankRecord},
  store::{CorpusStore, FIND_LIMIT},
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Snapshot {
  persons:   BTreeMap<String, Person>,
  countries: HashMap<String, Country>,
  events:    Vec<Event>,
  records:   HashMap<String, BestRecords>,
  index:     HashMap<String, EventIndex>,
}

/// `(best, person_id)` pairs sorted ascending, one array per kind.
#[derive(Debug, Default)]
struct EventIndex {
  single:  Vec<(i64, String)>,
  average: Vec<(i64, String)>,
}

impl EventIndex {
  fn of_kind(&self, kind: RankKind) -> &[(i64, String)] {
    match kind {
      RankKind::Single => &self.single,
      RankKind::Average => &self.average,
    }
  }

  fn of_kind_mut(&mut self, kind: RankKind) -> &mut Vec<(i64, String)> {
    match kind {
      RankKind::Single => &mut self.single,
      RankKind::Average => &mut self.average,
    }
  }
}

/// A corpus snapshot held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Snapshot>,
}

impl MemoryStore {
  pub fn builder() -> MemoryStoreBuilder { MemoryStoreBuilder::default() }

  pub fn person_count(&self) -> usize { self.inner.persons.len() }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Accumulates reference data and records, then freezes them into a
/// [`MemoryStore`].
#[derive(Debug, Default)]
pub struct MemoryStoreBuilder {
  snapshot: Snapshot,
}

impl MemoryStoreBuilder {
  pub fn person(mut self, person: Person) -> Self {
    self.snapshot.persons.insert(person.id.clone(), person);
    self
  }

  pub fn country(mut self, country: Country) -> Self {
    self.snapshot.countries.insert(country.id.clone(), country);
    self
  }

  pub fn event(mut self, event: Event) -> Self {
    self.snapshot.events.retain(|e| e.id != event.id);
    self.snapshot.events.push(event);
    self
  }

  /// Add a record; a later record for the same person, event and kind
  /// replaces the earlier one.
  pub fn record(mut self, kind: RankKind, record: RankRecord) -> Self {
    self
      .snapshot
      .records
      .entry(record.person_id.clone())
      .or_default()
      .insert(kind, record);
    self
  }

  pub fn build(mut self) -> MemoryStore {
    self
      .snapshot
      .events
      .sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));

    let mut index: HashMap<String, EventIndex> = HashMap::new();
    for records in self.snapshot.records.values() {
      for kind in RankKind::ALL {
        for record in records.of_kind(kind).values() {
          index
            .entry(record.event_id.clone())
            .or_default()
            .of_kind_mut(kind)
            .push((record.best, record.person_id.clone()));
        }
      }
    }
    for event_index in index.values_mut() {
      event_index.single.sort_unstable();
      event_index.average.sort_unstable();
    }
    self.snapshot.index = index;

    MemoryStore { inner: Arc::new(self.snapshot) }
  }
}

// ─── CorpusStore impl ────────────────────────────────────────────────────────

impl CorpusStore for MemoryStore {
  type Error = Infallible;

  // Immutable once built, so a clone is already a snapshot.
  async fn snapshot(&self) -> Result<Self, Infallible> { Ok(self.clone()) }

  async fn get_person(&self, id: &str) -> Result<Option<Person>, Infallible> {
    Ok(self.inner.persons.get(id).cloned())
  }

  async fn get_persons(&self, ids: &[String]) -> Result<Vec<Person>, Infallible> {
    Ok(
      ids
        .iter()
        .filter_map(|id| self.inner.persons.get(id))
        .cloned()
        .collect(),
    )
  }

  async fn find_persons(&self, keyword: &str) -> Result<Vec<Person>, Infallible> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
      return Ok(Vec::new());
    }
    if let Some(person) = self
      .inner
      .persons
      .values()
      .find(|p| p.id.eq_ignore_ascii_case(keyword))
    {
      return Ok(vec![person.clone()]);
    }

    let needle = keyword.to_lowercase();
    let mut found: Vec<Person> = self
      .inner
      .persons
      .values()
      .filter(|p| p.name.to_lowercase().contains(&needle))
      .cloned()
      .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    found.truncate(FIND_LIMIT);
    Ok(found)
  }

  async fn get_best_records(&self, person_id: &str) -> Result<BestRecords, Infallible> {
    Ok(self.inner.records.get(person_id).cloned().unwrap_or_default())
  }

  async fn persons_below(
    &self,
    event_id: &str,
    kind: RankKind,
    threshold: i64,
  ) -> Result<HashSet<String>, Infallible> {
    let Some(event_index) = self.inner.index.get(event_id) else {
      return Ok(HashSet::new());
    };
    let sorted = event_index.of_kind(kind);
    let from = sorted.partition_point(|(best, _)| *best <= 0);
    let to = sorted.partition_point(|(best, _)| *best < threshold);
    if from >= to {
      return Ok(HashSet::new());
    }
    Ok(sorted[from..to].iter().map(|(_, id)| id.clone()).collect())
  }

  async fn list_events(&self) -> Result<Vec<Event>, Infallible> {
    Ok(self.inner.events.clone())
  }

  async fn get_country(&self, id: &str) -> Result<Option<Country>, Infallible> {
    Ok(self.inner.countries.get(id).cloned())
  }

  async fn get_countries(
    &self,
    ids: &[String],
  ) -> Result<HashMap<String, Country>, Infallible> {
    Ok(
      ids
        .iter()
        .filter_map(|id| self.inner.countries.get_key_value(id))
        .map(|(id, c)| (id.clone(), c.clone()))
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::FormatTag;

  fn person(id: &str, name: &str) -> Person {
    Person {
      id:         id.to_owned(),
      name:       name.to_owned(),
      country_id: None,
    }
  }

  fn store() -> MemoryStore {
    MemoryStore::builder()
      .person(person("2010AAAA01", "Alice Anders"))
      .person(person("2011BBBB01", "Bob Brown"))
      .person(person("2012CCCC01", "Carol Anderson"))
      .event(Event {
        id:     "333".into(),
        name:   "3x3x3 Cube".into(),
        format: FormatTag::Time,
        rank:   10,
      })
      .event(Event {
        id:     "222".into(),
        name:   "2x2x2 Cube".into(),
        format: FormatTag::Time,
        rank:   20,
      })
      .record(RankKind::Single, RankRecord::new("2010AAAA01", "333", 700))
      .record(RankKind::Single, RankRecord::new("2011BBBB01", "333", 800))
      .record(RankKind::Single, RankRecord::new("2012CCCC01", "333", -1))
      .record(RankKind::Average, RankRecord::new("2010AAAA01", "333", 900))
      .build()
  }

  #[tokio::test]
  async fn persons_below_is_strict_and_skips_unset() {
    let s = store();
    let below = s.persons_below("333", RankKind::Single, 800).await.unwrap();
    assert_eq!(below, HashSet::from(["2010AAAA01".to_owned()]));

    let below = s.persons_below("333", RankKind::Single, 801).await.unwrap();
    assert_eq!(below.len(), 2);

    let below = s.persons_below("333", RankKind::Single, 1).await.unwrap();
    assert!(below.is_empty());

    let below = s.persons_below("444", RankKind::Single, 10_000).await.unwrap();
    assert!(below.is_empty());
  }

  #[tokio::test]
  async fn find_persons_exact_id_wins() {
    let s = store();
    let found = s.find_persons("2011bbbb01").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Bob Brown");
  }

  #[tokio::test]
  async fn find_persons_by_name_substring() {
    let s = store();
    let found = s.find_persons("ANDER").await.unwrap();
    let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Alice Anders", "Carol Anderson"]);
    assert!(s.find_persons("   ").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn events_are_ordered_by_rank() {
    let s = store();
    let ids: Vec<_> = s
      .list_events()
      .await
      .unwrap()
      .into_iter()
      .map(|e| e.id)
      .collect();
    assert_eq!(ids, ["333", "222"]);
  }

  #[tokio::test]
  async fn best_records_for_unknown_person_are_empty() {
    let s = store();
    assert!(s.get_best_records("nobody").await.unwrap().is_empty());
    let alice = s.get_best_records("2010AAAA01").await.unwrap();
    assert_eq!(alice.get(RankKind::Average, "333").map(|r| r.best), Some(900));
  }
}
