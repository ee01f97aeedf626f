//! Head-to-head ("PK") comparison of two persons, event by event.
//!
//! Each event contributes up to two points: one for the better single and
//! one for the better average. A valid result always beats a missing or
//! failed one; equal results and two missing results score nothing.

use std::{cmp::Ordering, collections::HashMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Error, Result,
  event::{Event, FormatTag, short_code},
  person::Person,
  record::{BestRecords, RankKind},
  result::Outcome,
  store::CorpusStore,
};

/// Marker appended to the winning value in rendered lines.
const WIN_MARK: &str = " (★)";

// ─── Types ───────────────────────────────────────────────────────────────────

/// One of the two compared persons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  A,
  B,
}

impl Side {
  pub fn other(self) -> Self {
    match self {
      Self::A => Self::B,
      Self::B => Self::A,
    }
  }
}

impl fmt::Display for Side {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::A => "first",
      Self::B => "second",
    })
  }
}

/// Both sides' outcome for one metric of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDuel {
  pub a:      Outcome,
  pub b:      Outcome,
  pub winner: Option<Side>,
}

impl MetricDuel {
  pub fn new(a: Outcome, b: Outcome) -> Self {
    let winner = match a.compare(&b) {
      Ordering::Less => Some(Side::A),
      Ordering::Greater => Some(Side::B),
      Ordering::Equal => None,
    };
    Self { a, b, winner }
  }

  pub fn has_valid(&self) -> bool { self.a.is_valid() || self.b.is_valid() }

  /// The same duel seen from the other side.
  pub fn mirrored(&self) -> Self {
    Self { a: self.b, b: self.a, winner: self.winner.map(Side::other) }
  }

  fn points(&self, side: Side) -> u32 { u32::from(self.winner == Some(side)) }

  fn render(&self) -> String {
    let mark = |side| if self.winner == Some(side) { WIN_MARK } else { "" };
    format!("{}{} || {}{}", self.a, mark(Side::A), self.b, mark(Side::B))
  }
}

/// Both metrics of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDuel {
  pub event_id: String,
  pub format:   FormatTag,
  pub single:   MetricDuel,
  pub average:  MetricDuel,
}

impl EventDuel {
  pub fn points(&self, side: Side) -> u32 {
    self.single.points(side) + self.average.points(side)
  }

  pub fn mirrored(&self) -> Self {
    Self {
      event_id: self.event_id.clone(),
      format:   self.format,
      single:   self.single.mirrored(),
      average:  self.average.mirrored(),
    }
  }

  /// One text line: `333  5.00 (★) || 6.00  |  6.50 || 6.20 (★)`.
  pub fn line(&self) -> String {
    format!(
      "{}  {}  |  {}",
      short_code(&self.event_id),
      self.single.render(),
      self.average.render()
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  AWins,
  BWins,
  Draw,
}

/// The full comparison of two persons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadToHead {
  pub person_a: Person,
  pub person_b: Person,
  /// Events where at least one side has a valid single or average, in event
  /// display order.
  pub events:   Vec<EventDuel>,
  pub score_a:  u32,
  pub score_b:  u32,
}

impl HeadToHead {
  pub fn verdict(&self) -> Verdict {
    match self.score_a.cmp(&self.score_b) {
      Ordering::Greater => Verdict::AWins,
      Ordering::Less => Verdict::BWins,
      Ordering::Equal => Verdict::Draw,
    }
  }

  /// Aggregate line, e.g. `Alice wins 5:3` or `draw 2:2`.
  pub fn summary(&self) -> String {
    let score = format!("{}:{}", self.score_a, self.score_b);
    match self.verdict() {
      Verdict::AWins => format!("{} wins {score}", self.person_a.name),
      Verdict::BWins => format!("{} wins {score}", self.person_b.name),
      Verdict::Draw => format!("draw {score}"),
    }
  }
}

// ─── Comparator ──────────────────────────────────────────────────────────────

/// Compares persons against one store snapshot.
#[derive(Debug)]
pub struct Comparator<S> {
  store: Arc<S>,
}

impl<S> Clone for Comparator<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: CorpusStore> Comparator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Compare `id_a` against `id_b`.
  ///
  /// Fails with [`Error::PersonNotFound`] naming the side whose id is
  /// unknown, or [`Error::NoComparableRecords`] when neither person has any
  /// record.
  pub async fn compare(&self, id_a: &str, id_b: &str) -> Result<HeadToHead> {
    let snapshot = self.store.snapshot().await.map_err(Error::store)?;
    let store = &snapshot;
    let person_a = person(store, Side::A, id_a).await?;
    let person_b = person(store, Side::B, id_b).await?;

    let records_a = store.get_best_records(&person_a.id).await.map_err(Error::store)?;
    let records_b = store.get_best_records(&person_b.id).await.map_err(Error::store)?;
    if records_a.is_empty() && records_b.is_empty() {
      return Err(Error::NoComparableRecords);
    }

    let events: HashMap<String, Event> = store
      .list_events()
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|e| (e.id.clone(), e))
      .collect();

    let mut event_ids: Vec<&str> =
      records_a.event_ids().chain(records_b.event_ids()).collect();
    event_ids.sort_unstable_by(|x, y| {
      let rank = |id: &str| events.get(id).map_or(i64::MAX, |e| e.rank);
      rank(*x).cmp(&rank(*y)).then_with(|| x.cmp(y))
    });
    event_ids.dedup();

    let duels: Vec<EventDuel> = event_ids
      .into_iter()
      .map(|event_id| {
        let format = events.get(event_id).map(|e| e.format).unwrap_or_default();
        duel(event_id, format, &records_a, &records_b)
      })
      .filter(|d| d.single.has_valid() || d.average.has_valid())
      .collect();

    let score_a: u32 = duels.iter().map(|d| d.points(Side::A)).sum();
    let score_b: u32 = duels.iter().map(|d| d.points(Side::B)).sum();

    info!(
      a = %person_a.id,
      b = %person_b.id,
      events = duels.len(),
      score_a,
      score_b,
      "head-to-head finished"
    );

    Ok(HeadToHead { person_a, person_b, events: duels, score_a, score_b })
  }

}

async fn person<S: CorpusStore>(store: &S, side: Side, id: &str) -> Result<Person> {
  store
    .get_person(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::PersonNotFound(side, id.to_owned()))
}

fn duel(
  event_id: &str,
  format: FormatTag,
  a: &BestRecords,
  b: &BestRecords,
) -> EventDuel {
  let metric = |kind: RankKind| {
    let outcome = |records: &BestRecords| {
      records
        .get(kind, event_id)
        .map_or(Outcome::Unset, |r| r.outcome(format))
    };
    MetricDuel::new(outcome(a), outcome(b))
  };
  EventDuel {
    event_id: event_id.to_owned(),
    format,
    single: metric(RankKind::Single),
    average: metric(RankKind::Average),
  }
}
