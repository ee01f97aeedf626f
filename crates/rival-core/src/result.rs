//! The result codec: decoding raw result integers into [`Outcome`]s,
//! ordering outcomes, and rendering them as display text.
//!
//! Raw values are the integers stored in rank records. Their meaning depends
//! on the event's [`FormatTag`]:
//!
//! | format         | valid value                                        |
//! |----------------|----------------------------------------------------|
//! | `Time`         | centiseconds                                       |
//! | `MoveCount`    | moves, or hundredths of a move when `>= 100`       |
//! | `MultiAttempt` | packed decimal, see [`MultiResult`]                |
//!
//! `0` is always unset. `Time` and `MoveCount` reserve `-1` (DNF) and `-2`
//! (DNS). Decoding never fails; anything unrecognised becomes
//! [`Outcome::Unset`].

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

use crate::event::FormatTag;

const DNF: i64 = -1;
const DNS: i64 = -2;

/// Seconds field value meaning "time not recorded".
const UNKNOWN_SECONDS: u32 = 99_999;

/// Move counts at or above this are averages stored in hundredths.
const MOVE_HUNDREDTHS_FROM: u32 = 100;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A decoded multi-attempt result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiResult {
  pub solved:    u32,
  pub attempted: u32,
  /// `None` when the time was not recorded.
  pub seconds:   Option<u32>,
}

impl MultiResult {
  pub fn missed(&self) -> u32 { self.attempted.saturating_sub(self.solved) }

  /// Solved minus missed; the primary ranking key.
  pub fn points(&self) -> i64 { i64::from(self.solved) - i64::from(self.missed()) }
}

/// The format-specific quantity of a valid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Measure {
  Centiseconds(u32),
  /// Raw move value; hundredths of a move when `>= 100`.
  Moves(u32),
  Multi(MultiResult),
}

impl Measure {
  /// The strict "smaller is better" scalar, if this measure has one.
  pub fn scalar(&self) -> Option<u32> {
    match self {
      Self::Centiseconds(v) | Self::Moves(v) => Some(*v),
      Self::Multi(_) => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "measure", rename_all = "snake_case")]
pub enum Outcome {
  Dnf,
  Dns,
  Unset,
  Valid(Measure),
}

// ─── Decode ──────────────────────────────────────────────────────────────────

impl Outcome {
  pub fn decode(raw: i64, format: FormatTag) -> Self {
    match format {
      FormatTag::Time => decode_scalar(raw, Measure::Centiseconds),
      FormatTag::MoveCount => decode_scalar(raw, Measure::Moves),
      FormatTag::MultiAttempt => decode_multi(raw)
        .map(|m| Self::Valid(Measure::Multi(m)))
        .unwrap_or(Self::Unset),
    }
  }

  pub fn is_valid(&self) -> bool { matches!(self, Self::Valid(_)) }

  pub fn scalar(&self) -> Option<u32> {
    match self {
      Self::Valid(m) => m.scalar(),
      _ => None,
    }
  }

  /// Order two outcomes; [`Ordering::Less`] means `self` is the better one.
  ///
  /// A valid outcome beats any non-valid one; two non-valid outcomes tie.
  /// Scalar measures compare numerically. Multi-attempt results rank by
  /// points, then known time, then fewer misses. Measures of different kinds
  /// tie.
  pub fn compare(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Self::Valid(a), Self::Valid(b)) => compare_measures(a, b),
      (Self::Valid(_), _) => Ordering::Less,
      (_, Self::Valid(_)) => Ordering::Greater,
      _ => Ordering::Equal,
    }
  }
}

fn decode_scalar(raw: i64, valid: fn(u32) -> Measure) -> Outcome {
  match raw {
    0 => Outcome::Unset,
    DNF => Outcome::Dnf,
    DNS => Outcome::Dns,
    v if v > 0 => u32::try_from(v)
      .map(|v| Outcome::Valid(valid(v)))
      .unwrap_or(Outcome::Unset),
    _ => Outcome::Unset,
  }
}

/// Decode the packed multi-attempt value, read as ten zero-padded digits.
///
/// - `1SSAATTTTT` (legacy): solved = 99 − SS, attempted = AA, TTTTT seconds.
/// - `0DDTTTTTMM` (current): difference = 99 − DD, TTTTT seconds, MM missed;
///   solved = difference + missed, attempted = solved + missed.
fn decode_multi(raw: i64) -> Option<MultiResult> {
  if raw <= 0 {
    return None;
  }
  let digits = format!("{raw:010}");
  if digits.len() != 10 {
    return None;
  }
  let field = |from: usize, to: usize| digits[from..to].parse::<u32>().ok();
  let seconds = |t: u32| (t != UNKNOWN_SECONDS).then_some(t);

  match &digits[..1] {
    "1" => Some(MultiResult {
      solved:    99 - field(1, 3)?,
      attempted: field(3, 5)?,
      seconds:   seconds(field(5, 10)?),
    }),
    "0" => {
      let difference = 99 - field(1, 3)?;
      let time = field(3, 8)?;
      let missed = field(8, 10)?;
      let solved = difference + missed;
      Some(MultiResult {
        solved,
        attempted: solved + missed,
        seconds: seconds(time),
      })
    }
    _ => None,
  }
}

// ─── Compare ─────────────────────────────────────────────────────────────────

fn compare_measures(a: &Measure, b: &Measure) -> Ordering {
  match (a, b) {
    (Measure::Centiseconds(x), Measure::Centiseconds(y))
    | (Measure::Moves(x), Measure::Moves(y)) => x.cmp(y),
    (Measure::Multi(x), Measure::Multi(y)) => y
      .points()
      .cmp(&x.points())
      .then_with(|| match (x.seconds, y.seconds) {
        (Some(s), Some(t)) => s.cmp(&t),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
      })
      .then_with(|| x.missed().cmp(&y.missed())),
    _ => Ordering::Equal,
  }
}

// ─── Format ──────────────────────────────────────────────────────────────────

impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Dnf => f.write_str("DNF"),
      Self::Dns => f.write_str("DNS"),
      Self::Unset => f.write_str("-"),
      Self::Valid(m) => write!(f, "{m}"),
    }
  }
}

impl fmt::Display for Measure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::Centiseconds(cs) => {
        let minutes = cs / 6000;
        let seconds = cs % 6000 / 100;
        let hundredths = cs % 100;
        if minutes > 0 {
          write!(f, "{minutes}:{seconds:02}.{hundredths:02}")
        } else {
          write!(f, "{seconds}.{hundredths:02}")
        }
      }
      Self::Moves(v) if v >= MOVE_HUNDREDTHS_FROM => {
        write!(f, "{}.{:02}", v / 100, v % 100)
      }
      Self::Moves(v) => write!(f, "{v}"),
      Self::Multi(m) => {
        write!(f, "{}/{} ", m.solved, m.attempted)?;
        let Some(total) = m.seconds else {
          return f.write_str("(time unknown)");
        };
        let hours = total / 3600;
        let minutes = total % 3600 / 60;
        let seconds = total % 60;
        if hours > 0 {
          write!(f, "{hours}:{minutes:02}:{seconds:02}")
        } else {
          write!(f, "{minutes}:{seconds:02}")
        }
      }
    }
  }
}

// ─── Free-function forms ─────────────────────────────────────────────────────

pub fn decode(raw: i64, format: FormatTag) -> Outcome {
  Outcome::decode(raw, format)
}

pub fn compare(a: &Outcome, b: &Outcome) -> Ordering { a.compare(b) }

pub fn format(outcome: &Outcome) -> String { outcome.to_string() }

/// Decode and render in one step.
pub fn format_raw(raw: i64, format: FormatTag) -> String {
  Outcome::decode(raw, format).to_string()
}
