//! Personal-best rank records.
//!
//! Records are produced by the ingestion pipeline; a person has at most one
//! [`RankKind::Single`] and one [`RankKind::Average`] record per event.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{event::FormatTag, result::Outcome};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RankKind {
  Single,
  Average,
}

impl RankKind {
  pub const ALL: [RankKind; 2] = [RankKind::Single, RankKind::Average];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRecord {
  pub person_id:      String,
  pub event_id:       String,
  /// Raw encoded result; decode with [`RankRecord::outcome`].
  pub best:           i64,
  pub world_rank:     Option<u32>,
  pub continent_rank: Option<u32>,
  pub country_rank:   Option<u32>,
}

impl RankRecord {
  /// A record with no rank information.
  pub fn new(
    person_id: impl Into<String>,
    event_id: impl Into<String>,
    best: i64,
  ) -> Self {
    Self {
      person_id: person_id.into(),
      event_id: event_id.into(),
      best,
      world_rank: None,
      continent_rank: None,
      country_rank: None,
    }
  }

  pub fn outcome(&self, format: FormatTag) -> Outcome {
    Outcome::decode(self.best, format)
  }
}

/// Convert a stored rank column to `Option`; zero and negatives mean unset.
pub fn rank_from_raw(raw: i64) -> Option<u32> {
  u32::try_from(raw).ok().filter(|r| *r > 0)
}

/// All of one person's records, keyed by event id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRecords {
  pub single:  BTreeMap<String, RankRecord>,
  pub average: BTreeMap<String, RankRecord>,
}

impl BestRecords {
  pub fn of_kind(&self, kind: RankKind) -> &BTreeMap<String, RankRecord> {
    match kind {
      RankKind::Single => &self.single,
      RankKind::Average => &self.average,
    }
  }

  pub fn get(&self, kind: RankKind, event_id: &str) -> Option<&RankRecord> {
    self.of_kind(kind).get(event_id)
  }

  pub fn insert(&mut self, kind: RankKind, record: RankRecord) {
    let map = match kind {
      RankKind::Single => &mut self.single,
      RankKind::Average => &mut self.average,
    };
    map.insert(record.event_id.clone(), record);
  }

  pub fn is_empty(&self) -> bool {
    self.single.is_empty() && self.average.is_empty()
  }

  /// Every event with at least one record, in id order.
  pub fn event_ids(&self) -> impl Iterator<Item = &str> {
    let mut ids: Vec<&str> = self
      .single
      .keys()
      .chain(self.average.keys())
      .map(String::as_str)
      .collect();
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter()
  }
}
