//! Matches (fixtures) and the loose kickoff-date parser used by ingestion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound as _, TimeZone as _, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a match.
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
pub enum MatchStatus {
  #[default]
  Scheduled,
  Live,
  Finished,
  Postponed,
  Canceled,
}

impl MatchStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A fixture between two teams of one league.
///
/// The natural key is `(league_id, home_team_id, away_team_id, kickoff_at)`.
/// `home_team_id != away_team_id` is enforced when the payload is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
  pub id:             i64,
  pub league_id:      i64,
  pub home_team_id:   i64,
  pub away_team_id:   i64,
  pub kickoff_at:     DateTime<Utc>,
  pub venue:          Option<String>,
  pub status:         MatchStatus,
  pub score_home:     Option<i64>,
  pub score_away:     Option<i64>,
  /// Free-text confidence bucket label the match arrived under.
  pub tip_confidence: Option<String>,
}

const DATETIME_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%d/%m/%Y %H:%M:%S",
  "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a loosely formatted kickoff string into UTC with second precision.
///
/// Accepts RFC 3339, `YYYY-MM-DD[ T]HH:MM[:SS]`, `DD/MM/YYYY [HH:MM[:SS]]`
/// and bare dates (midnight UTC). Naive values are taken as UTC. Returns
/// `None` when nothing matches.
pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc).trunc_subsecs(0));
  }

  for fmt in DATETIME_FORMATS {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
      return Some(Utc.from_utc_datetime(&naive));
    }
  }

  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(|naive| Utc.from_utc_datetime(&naive))
}
