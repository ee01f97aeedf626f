//! Events and their result formats.

use serde::{Deserialize, Serialize};

/// How an event's raw result integers are encoded.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FormatTag {
  /// Elapsed time in centiseconds.
  #[default]
  Time,
  /// Fewest-moves count; averages are stored in hundredths of a move.
  MoveCount,
  /// Multi-attempt blindfolded; packed solved/attempted/seconds.
  MultiAttempt,
}

impl FormatTag {
  /// Parse the tag used in the tabular export (`time`, `number`, `multi`).
  /// Unknown tags are treated as [`FormatTag::Time`].
  pub fn from_export(tag: &str) -> Self {
    match tag.trim().to_ascii_lowercase().as_str() {
      "number" | "move-count" | "move_count" => Self::MoveCount,
      "multi" | "multi-attempt" | "multi_attempt" => Self::MultiAttempt,
      _ => Self::Time,
    }
  }

  /// The tag written back to storage.
  pub fn as_export(self) -> &'static str {
    match self {
      Self::Time => "time",
      Self::MoveCount => "number",
      Self::MultiAttempt => "multi",
    }
  }

  /// Whether results of this format have a single "smaller is better" scalar.
  pub fn is_scalar(self) -> bool { !matches!(self, Self::MultiAttempt) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub id:     String,
  pub name:   String,
  pub format: FormatTag,
  /// Display order; lower comes first.
  pub rank:   i64,
}

impl Event {
  /// Short code used in compact text output.
  pub fn code(&self) -> &str { short_code(&self.id) }
}

/// Short display code for an event id (`pyram` → `py`, `skewb` → `sk`).
pub fn short_code(event_id: &str) -> &str {
  match event_id {
    "pyram" => "py",
    "skewb" => "sk",
    other => other,
  }
}
