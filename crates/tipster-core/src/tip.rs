//! Tips: a single published prediction on one market of one match.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::market::MarketCode;

// ─── Risk ────────────────────────────────────────────────────────────────────

/// Risk attached to a tip, derived from the confidence bucket it arrived in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
  Low,
  Mid,
  High,
  Unknown,
}

impl RiskLevel {
  /// `max` → high, `avg` → mid, `min` → low, anything else → unknown.
  ///
  /// Every tip-creation path goes through this mapping.
  pub fn from_confidence(bucket: &str) -> Self {
    match bucket {
      "max" => Self::High,
      "avg" => Self::Mid,
      "min" => Self::Low,
      _ => Self::Unknown,
    }
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Lifecycle enums ─────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
  Public,
  #[default]
  Premium,
}

impl Visibility {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TipStatus {
  #[default]
  Pending,
  Settled,
}

impl TipStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// Outcome of a tip once its match is over.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TipResult {
  #[default]
  Pending,
  Won,
  Lost,
  Void,
  Canceled,
}

impl TipResult {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Whether this result closes the tip. `Pending` does not.
  pub fn is_final(self) -> bool { !matches!(self, Self::Pending) }
}

// ─── Tip ─────────────────────────────────────────────────────────────────────

/// A persisted prediction. Unique per `(match_id, prediction_type, pick_label)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
  pub id:               i64,
  pub match_id:         i64,
  pub author_id:        Option<i64>,
  pub prediction_type:  MarketCode,
  /// Lossless text encoding: the signed result for sign markets (`"-1"`),
  /// the canonical decimal threshold for over/under (`"2.5"`).
  pub prediction_value: String,
  pub pick_label:       String,
  pub odds:             f64,
  pub risk_level:       RiskLevel,
  pub is_free:          bool,
  /// Only meaningful when `is_free` is set.
  pub free_for_date:    Option<NaiveDate>,
  pub visibility:       Visibility,
  pub publish_at:       DateTime<Utc>,
  pub status:           TipStatus,
  pub result:           TipResult,
  pub settled_at:       Option<DateTime<Utc>>,
}

impl Tip {
  /// A tip is free on `date` only when flagged free for exactly that day.
  pub fn is_free_on(&self, date: NaiveDate) -> bool {
    self.is_free && self.free_for_date == Some(date)
  }
}
