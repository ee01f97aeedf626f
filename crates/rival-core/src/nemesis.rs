//! The superiority ("nemesis") search.
//!
//! Finds every person who is strictly better than a target in every event the
//! target has a comparable result in, then groups them by geography.
//!
//! The search turns the target's records into one [`Constraint`] per event,
//! orders constraints by how few persons are likely to satisfy them, and
//! intersects the per-event answers from [`CorpusStore::persons_below`] one
//! event at a time. An empty intersection ends the search early.

use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  Error, Result, continent,
  event::FormatTag,
  person::Person,
  record::{BestRecords, RankKind},
  store::CorpusStore,
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Which of the target's events become constraints.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
  /// Every event with a single or an average constrains; events with both
  /// require beating both.
  #[default]
  PerMetric,
  /// Only events where the target has both a single and an average
  /// constrain.
  RequireBoth,
}

// ─── Constraints ─────────────────────────────────────────────────────────────

/// A candidate must have a strictly smaller value than every threshold that is
/// present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
  pub event_id: String,
  pub single:   Option<i64>,
  pub average:  Option<i64>,
}

impl Constraint {
  /// Sort key: the smallest threshold. Smaller values admit fewer persons.
  pub fn selectivity(&self) -> i64 {
    match (self.single, self.average) {
      (Some(s), Some(a)) => s.min(a),
      (Some(v), None) | (None, Some(v)) => v,
      (None, None) => i64::MAX,
    }
  }
}

/// Build the constraint list for a target, most selective first.
///
/// Only events of a scalar format with a positive value take part;
/// multi-attempt results have no strict ordering and are ignored, as are
/// events missing from `formats`.
pub fn plan(
  records: &BestRecords,
  formats: &HashMap<String, FormatTag>,
  policy: MatchPolicy,
) -> Vec<Constraint> {
  let usable = |kind: RankKind, event_id: &str| {
    records
      .get(kind, event_id)
      .map(|r| r.best)
      .filter(|best| *best > 0)
  };

  let mut constraints: Vec<Constraint> = records
    .event_ids()
    .filter(|event_id| match formats.get(*event_id) {
      Some(format) => format.is_scalar(),
      None => {
        warn!(event_id, "record for unknown event ignored");
        false
      }
    })
    .filter_map(|event_id| {
      let single = usable(RankKind::Single, event_id);
      let average = usable(RankKind::Average, event_id);
      let keep = match policy {
        MatchPolicy::PerMetric => single.is_some() || average.is_some(),
        MatchPolicy::RequireBoth => single.is_some() && average.is_some(),
      };
      keep.then(|| Constraint { event_id: event_id.to_owned(), single, average })
    })
    .collect();

  constraints.sort_by(|a, b| {
    a.selectivity()
      .cmp(&b.selectivity())
      .then_with(|| a.event_id.cmp(&b.event_id))
  });
  constraints
}

/// Intersect the persons satisfying each constraint, in the given order.
///
/// Returns the empty set when `constraints` is empty. Stops issuing queries as
/// soon as the running intersection is empty.
pub async fn intersect<S: CorpusStore>(
  store: &S,
  constraints: &[Constraint],
) -> Result<HashSet<String>> {
  let mut survivors: Option<HashSet<String>> = None;

  for constraint in constraints {
    let mut matched = match constraint.single {
      Some(threshold) => Some(
        store
          .persons_below(&constraint.event_id, RankKind::Single, threshold)
          .await
          .map_err(Error::store)?,
      ),
      None => None,
    };

    let skip_average = matched.as_ref().is_some_and(HashSet::is_empty);
    if let Some(threshold) = constraint.average
      && !skip_average
    {
      let average = store
        .persons_below(&constraint.event_id, RankKind::Average, threshold)
        .await
        .map_err(Error::store)?;
      matched = Some(match matched {
        Some(mut single) => {
          single.retain(|id| average.contains(id));
          single
        }
        None => average,
      });
    }

    let matched = matched.unwrap_or_default();
    let running = match survivors.take() {
      Some(mut running) => {
        running.retain(|id| matched.contains(id));
        running
      }
      None => matched,
    };

    debug!(
      event_id = %constraint.event_id,
      survivors = running.len(),
      "constraint applied"
    );

    let exhausted = running.is_empty();
    survivors = Some(running);
    if exhausted {
      debug!(event_id = %constraint.event_id, "no survivors, stopping early");
      break;
    }
  }

  Ok(survivors.unwrap_or_default())
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The persons better than a target, grouped by geography.
///
/// `continent_list` and `country` are subsets of `world`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NemesisReport {
  pub target:         Person,
  /// The target's resolved continent, or [`continent::UNKNOWN`].
  pub continent:      String,
  pub world:          Vec<Person>,
  pub continent_list: Vec<Person>,
  pub country:        Vec<Person>,
}

impl NemesisReport {
  pub fn world_count(&self) -> usize { self.world.len() }

  pub fn continent_count(&self) -> usize { self.continent_list.len() }

  pub fn country_count(&self) -> usize { self.country.len() }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Runs superiority searches against one store snapshot.
#[derive(Debug)]
pub struct NemesisSearch<S> {
  store:  Arc<S>,
  policy: MatchPolicy,
}

impl<S> Clone for NemesisSearch<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: self.policy }
  }
}

impl<S: CorpusStore> NemesisSearch<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, policy: MatchPolicy::default() }
  }

  pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
    self.policy = policy;
    self
  }

  /// Find everyone better than `target_id` in all of the target's events.
  ///
  /// Fails with [`Error::NotFound`] when the id is unknown. A target without
  /// comparable records yields an empty report. Every read of one query goes
  /// through a single [`CorpusStore::snapshot`].
  pub async fn query(&self, target_id: &str) -> Result<NemesisReport> {
    let snapshot = self.store.snapshot().await.map_err(Error::store)?;
    let store = &snapshot;
    let target = store
      .get_person(target_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(target_id.to_owned()))?;

    let records = store
      .get_best_records(&target.id)
      .await
      .map_err(Error::store)?;
    let formats: HashMap<String, FormatTag> = store
      .list_events()
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|e| (e.id, e.format))
      .collect();

    let constraints = plan(&records, &formats, self.policy);
    let survivors = intersect(store, &constraints).await?;

    let mut ids: Vec<String> = survivors.into_iter().collect();
    ids.sort_unstable();
    let mut world = if ids.is_empty() {
      Vec::new()
    } else {
      store.get_persons(&ids).await.map_err(Error::store)?
    };
    world.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let mut country_ids: Vec<String> = world
      .iter()
      .chain(std::iter::once(&target))
      .filter_map(|p| p.country_id.clone())
      .collect();
    country_ids.sort_unstable();
    country_ids.dedup();
    let countries = store
      .get_countries(&country_ids)
      .await
      .map_err(Error::store)?;

    let target_continent =
      continent::resolve(target.country_id.as_deref(), &countries);

    let continent_list: Vec<Person> = world
      .iter()
      .filter(|p| {
        continent::resolve(p.country_id.as_deref(), &countries) == target_continent
      })
      .cloned()
      .collect();
    let country: Vec<Person> = match target.country_id.as_deref() {
      Some(home) => world
        .iter()
        .filter(|p| p.country_id.as_deref() == Some(home))
        .cloned()
        .collect(),
      None => Vec::new(),
    };

    info!(
      target = %target.id,
      constraints = constraints.len(),
      world = world.len(),
      continent = continent_list.len(),
      country = country.len(),
      "nemesis search finished"
    );

    Ok(NemesisReport {
      target,
      continent: target_continent,
      world,
      continent_list,
      country,
    })
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;
  use crate::{
    event::Event,
    memory::MemoryStore,
    person::Country,
    record::RankRecord,
  };

  fn person(id: &str, name: &str, country: &str) -> Person {
    Person {
      id:         id.to_owned(),
      name:       name.to_owned(),
      country_id: Some(country.to_owned()),
    }
  }

  fn event(id: &str, format: FormatTag, rank: i64) -> Event {
    Event { id: id.to_owned(), name: id.to_owned(), format, rank }
  }

  fn country(id: &str, continent: &str) -> Country {
    Country {
      id:           id.to_owned(),
      continent_id: continent.to_owned(),
      iso2:         None,
    }
  }

  fn base() -> crate::memory::MemoryStoreBuilder {
    MemoryStore::builder()
      .event(event("A", FormatTag::Time, 1))
      .event(event("B", FormatTag::MoveCount, 2))
      .event(event("M", FormatTag::MultiAttempt, 3))
      .country(country("Germany", "_Europe"))
      .country(country("France", "_Europe"))
      .country(country("Japan", "_Asia"))
  }

  fn search(store: MemoryStore) -> NemesisSearch<MemoryStore> {
    NemesisSearch::new(Arc::new(store))
  }

  fn ids(persons: &[Person]) -> Vec<&str> {
    persons.iter().map(|p| p.id.as_str()).collect()
  }

  // ── End-to-end scenario ─────────────────────────────────────────────────────

  /// Target: single(A)=5.00, average(A)=6.00, single(B)=1.30 moves.
  fn scenario() -> MemoryStore {
    base()
      .person(person("T", "Target", "Germany"))
      .person(person("FAST", "Fast Everywhere", "France"))
      .person(person("NOB", "No B Record", "Germany"))
      .person(person("SLOWB", "Slow At B", "Germany"))
      .person(person("TIE", "Ties A Single", "Japan"))
      .record(RankKind::Single, RankRecord::new("T", "A", 500))
      .record(RankKind::Average, RankRecord::new("T", "A", 600))
      .record(RankKind::Single, RankRecord::new("T", "B", 130))
      // Beats everything.
      .record(RankKind::Single, RankRecord::new("FAST", "A", 400))
      .record(RankKind::Average, RankRecord::new("FAST", "A", 450))
      .record(RankKind::Single, RankRecord::new("FAST", "B", 120))
      // Beats both A metrics but has no B record at all.
      .record(RankKind::Single, RankRecord::new("NOB", "A", 300))
      .record(RankKind::Average, RankRecord::new("NOB", "A", 350))
      // Beats A, loses B.
      .record(RankKind::Single, RankRecord::new("SLOWB", "A", 310))
      .record(RankKind::Average, RankRecord::new("SLOWB", "A", 360))
      .record(RankKind::Single, RankRecord::new("SLOWB", "B", 140))
      // Ties the A single.
      .record(RankKind::Single, RankRecord::new("TIE", "A", 500))
      .record(RankKind::Average, RankRecord::new("TIE", "A", 500))
      .record(RankKind::Single, RankRecord::new("TIE", "B", 100))
      .build()
  }

  #[tokio::test]
  async fn competitor_missing_a_constrained_record_is_excluded() {
    let report = search(scenario()).query("T").await.unwrap();
    assert_eq!(ids(&report.world), ["FAST"]);
    assert!(!ids(&report.world).contains(&"NOB"));
  }

  #[tokio::test]
  async fn unconstrained_event_does_not_narrow() {
    // Without the target's B record, B is unconstrained and NOB qualifies.
    let store = base()
      .person(person("T", "Target", "Germany"))
      .person(person("NOB", "No B Record", "Germany"))
      .record(RankKind::Single, RankRecord::new("T", "A", 500))
      .record(RankKind::Average, RankRecord::new("T", "A", 600))
      .record(RankKind::Single, RankRecord::new("NOB", "A", 300))
      .record(RankKind::Average, RankRecord::new("NOB", "A", 350))
      .build();
    let report = search(store).query("T").await.unwrap();
    assert_eq!(ids(&report.world), ["NOB"]);
  }

  #[tokio::test]
  async fn ties_never_qualify() {
    let report = search(scenario()).query("T").await.unwrap();
    assert!(!ids(&report.world).contains(&"TIE"));
    assert!(!ids(&report.world).contains(&"T"));
  }

  #[tokio::test]
  async fn geography_partitions() {
    let store = base()
      .person(person("T", "Target", "Germany"))
      .person(person("DE", "German", "Germany"))
      .person(person("FR", "French", "France"))
      .person(person("JP", "Japanese", "Japan"))
      .person(person("XX", "Nowhere", "Atlantis"))
      .record(RankKind::Single, RankRecord::new("T", "A", 1000))
      .record(RankKind::Single, RankRecord::new("DE", "A", 900))
      .record(RankKind::Single, RankRecord::new("FR", "A", 800))
      .record(RankKind::Single, RankRecord::new("JP", "A", 700))
      .record(RankKind::Single, RankRecord::new("XX", "A", 600))
      .build();
    let report = search(store).query("T").await.unwrap();
    assert_eq!(report.continent, "Europe");
    assert_eq!(ids(&report.world), ["FR", "DE", "JP", "XX"]);
    assert_eq!(ids(&report.continent_list), ["FR", "DE"]);
    assert_eq!(ids(&report.country), ["DE"]);
    assert!(report.world_count() >= report.continent_count());
    assert!(report.continent_count() >= report.country_count());
  }

  #[tokio::test]
  async fn continent_falls_back_to_iso_table() {
    let store = MemoryStore::builder()
      .event(event("A", FormatTag::Time, 1))
      .person(person("T", "Target", "CN"))
      .person(person("JP", "Japanese", "JP"))
      .person(person("US", "American", "US"))
      .record(RankKind::Single, RankRecord::new("T", "A", 1000))
      .record(RankKind::Single, RankRecord::new("JP", "A", 900))
      .record(RankKind::Single, RankRecord::new("US", "A", 900))
      .build();
    let report = search(store).query("T").await.unwrap();
    assert_eq!(report.continent, "Asia");
    assert_eq!(ids(&report.continent_list), ["JP"]);
    assert!(report.country.is_empty());
  }

  #[tokio::test]
  async fn no_comparable_events_gives_empty_report() {
    let store = base()
      .person(person("T", "Target", "Germany"))
      .person(person("X", "Anyone", "Germany"))
      .record(RankKind::Single, RankRecord::new("T", "M", 900_359_901))
      .record(RankKind::Single, RankRecord::new("T", "A", -1))
      .record(RankKind::Single, RankRecord::new("X", "A", 100))
      .build();
    let report = search(store).query("T").await.unwrap();
    assert_eq!(report.world_count(), 0);
    assert_eq!(report.continent_count(), 0);
    assert_eq!(report.country_count(), 0);
  }

  #[tokio::test]
  async fn unknown_target_is_not_found() {
    let err = search(scenario()).query("NOPE").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(id) if id == "NOPE"));
  }

  #[tokio::test]
  async fn require_both_policy_ignores_single_only_events() {
    let engine = search(scenario()).with_policy(MatchPolicy::RequireBoth);
    let report = engine.query("T").await.unwrap();
    // Only A constrains, so NOB and SLOWB qualify too.
    assert_eq!(ids(&report.world), ["FAST", "NOB", "SLOWB"]);
  }

  #[tokio::test]
  async fn survivors_beat_target_on_every_constraint() {
    let store = scenario();
    let report = search(store.clone()).query("T").await.unwrap();
    let target = store.get_best_records("T").await.unwrap();
    for winner in &report.world {
      let theirs = store.get_best_records(&winner.id).await.unwrap();
      for kind in RankKind::ALL {
        for (event_id, mine) in target.of_kind(kind) {
          let Some(theirs) = theirs.get(kind, event_id) else {
            panic!("{} lacks {kind:?} {event_id}", winner.id);
          };
          assert!(theirs.best > 0 && theirs.best < mine.best);
        }
      }
    }
  }

  // ── Planning ────────────────────────────────────────────────────────────────

  #[test]
  fn plan_orders_by_smallest_threshold() {
    let mut records = BestRecords::default();
    records.insert(RankKind::Single, RankRecord::new("T", "A", 500));
    records.insert(RankKind::Average, RankRecord::new("T", "A", 600));
    records.insert(RankKind::Single, RankRecord::new("T", "B", 130));
    records.insert(RankKind::Average, RankRecord::new("T", "C", 90));
    records.insert(RankKind::Single, RankRecord::new("T", "M", 900_359_901));
    let formats: HashMap<String, FormatTag> = [
      ("A", FormatTag::Time),
      ("B", FormatTag::MoveCount),
      ("C", FormatTag::Time),
      ("M", FormatTag::MultiAttempt),
    ]
    .into_iter()
    .map(|(id, f)| (id.to_owned(), f))
    .collect();

    let plan = plan(&records, &formats, MatchPolicy::PerMetric);
    let order: Vec<_> = plan.iter().map(|c| c.event_id.as_str()).collect();
    assert_eq!(order, ["C", "B", "A"]);
    assert_eq!(plan[2], Constraint {
      event_id: "A".into(),
      single:   Some(500),
      average:  Some(600),
    });
  }

  #[tokio::test]
  async fn empty_plan_intersects_to_nothing() {
    let survivors = intersect(&scenario(), &[]).await.unwrap();
    assert!(survivors.is_empty());
  }

  // ── Order independence ──────────────────────────────────────────────────────

  fn corpus_strategy() -> impl Strategy<Value = Vec<[Option<i64>; 6]>> {
    // Per person: single/average for three time events; None = no record.
    let value = prop::option::of(prop_oneof![Just(-1i64), 1i64..60]);
    prop::collection::vec(
      [
        value.clone(),
        value.clone(),
        value.clone(),
        value.clone(),
        value.clone(),
        value,
      ],
      1..25,
    )
  }

  fn build_corpus(rows: &[[Option<i64>; 6]]) -> MemoryStore {
    let events = ["E1", "E2", "E3"];
    let mut builder = MemoryStore::builder();
    for (i, event_id) in events.iter().enumerate() {
      builder = builder.event(event(event_id, FormatTag::Time, i as i64));
    }
    for (p, row) in rows.iter().enumerate() {
      let id = format!("P{p:02}");
      builder = builder.person(person(&id, &id, "Germany"));
      for (e, event_id) in events.iter().enumerate() {
        if let Some(best) = row[e * 2] {
          builder = builder.record(RankKind::Single, RankRecord::new(&id, *event_id, best));
        }
        if let Some(best) = row[e * 2 + 1] {
          builder = builder.record(RankKind::Average, RankRecord::new(&id, *event_id, best));
        }
      }
    }
    builder.build()
  }

  proptest! {
    #[test]
    fn constraint_order_does_not_change_survivors(
      rows in corpus_strategy(),
      rotation in 0usize..6,
      reverse in any::<bool>(),
    ) {
      let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
      let store = build_corpus(&rows);

      runtime.block_on(async {
        let target = store.get_best_records("P00").await.unwrap();
        let formats: HashMap<String, FormatTag> = store
          .list_events()
          .await
          .unwrap()
          .into_iter()
          .map(|e| (e.id, e.format))
          .collect();
        let sorted = plan(&target, &formats, MatchPolicy::PerMetric);

        let mut shuffled = sorted.clone();
        if !shuffled.is_empty() {
          let len = shuffled.len();
          shuffled.rotate_left(rotation % len);
        }
        if reverse {
          shuffled.reverse();
        }

        let a = intersect(&store, &sorted).await.unwrap();
        let b = intersect(&store, &shuffled).await.unwrap();
        prop_assert_eq!(a, b);
        Ok(())
      })?;
    }
  }
}
