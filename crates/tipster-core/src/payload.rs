//! Decoder for the bulk match/tip ingestion payload.
//!
//! The payload is a JSON object keyed by confidence bucket (`max`, `avg`,
//! `min`, …), each holding an array of match rows:
//!
//! ```json
//! { "max": [ { "league": "EPL", "Home Team": "A", "Away Team": "B",
//!              "date": "2025-01-01", "jackpot": "SPMJ",
//!              "tips": { "1_X_2": { "odds": 1.9, "result": 1 } } } ] }
//! ```
//!
//! Decoding is total: rows that cannot be processed become [`SkippedRow`]s
//! carrying the reason and original index, everything else becomes a typed
//! [`MatchRow`]. Bucket and row order are preserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  fixture::{MatchStatus, parse_kickoff},
  market::{MarketTip, integer},
};

const KEY_LEAGUE: &str = "league";
const KEY_COUNTRY: &str = "country";
const KEY_HOME: &str = "Home Team";
const KEY_AWAY: &str = "Away Team";
const KEY_DATE: &str = "date";
const KEY_VENUE: &str = "venue";
const KEY_STATUS: &str = "status";
const KEY_SCORE_HOME: &str = "score_home";
const KEY_SCORE_AWAY: &str = "score_away";
const KEY_JACKPOT: &str = "jackpot";
const KEY_TIPS: &str = "tips";

// ─── Types ───────────────────────────────────────────────────────────────────

/// A match row that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
  pub confidence: String,
  /// Position within its bucket's array.
  pub index:      usize,
  pub league:     String,
  pub country:    Option<String>,
  pub home_team:  String,
  pub away_team:  String,
  pub kickoff:    DateTime<Utc>,
  pub venue:      Option<String>,
  /// `None` leaves a stored status untouched; new matches default to
  /// [`MatchStatus::Scheduled`].
  pub status:     Option<MatchStatus>,
  pub score_home: Option<i64>,
  pub score_away: Option<i64>,
  pub jackpot:    Option<String>,
  pub tips:       Vec<MarketTip>,
}

/// A row that was not processed, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
  pub confidence_level: String,
  pub index:            usize,
  pub league:           Option<String>,
  pub home_team:        Option<String>,
  pub away_team:        Option<String>,
  /// The raw `date` value as supplied.
  pub kickoff:          Option<String>,
  pub reason:           String,
}

/// A fully decoded payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestPayload {
  pub rows:            Vec<MatchRow>,
  pub skipped:         Vec<SkippedRow>,
  /// Bucket keys whose value was not an array.
  pub ignored_buckets: Vec<String>,
}

// ─── Decoding ────────────────────────────────────────────────────────────────

impl IngestPayload {
  /// Decode a parsed JSON document. Missing kickoff dates default to `now`.
  ///
  /// Fails only when the document is not an object.
  pub fn decode(doc: &Value, now: DateTime<Utc>) -> Result<Self> {
    let buckets = doc.as_object().ok_or(Error::PayloadNotObject)?;
    let mut payload = Self::default();

    for (confidence, rows) in buckets {
      let Some(rows) = rows.as_array() else {
        payload.ignored_buckets.push(confidence.clone());
        continue;
      };
      for (index, row) in rows.iter().enumerate() {
        match decode_row(confidence, index, row, now) {
          Ok(row) => payload.rows.push(row),
          Err(skipped) => payload.skipped.push(skipped),
        }
      }
    }

    Ok(payload)
  }

  /// Parse and decode raw request bytes.
  pub fn from_slice(bytes: &[u8], now: DateTime<Utc>) -> Result<Self> {
    let doc: Value = serde_json::from_slice(bytes)?;
    Self::decode(&doc, now)
  }
}

fn decode_row(
  confidence: &str,
  index: usize,
  row: &Value,
  now: DateTime<Utc>,
) -> Result<MatchRow, SkippedRow> {
  let empty = Map::new();
  let obj = row.as_object().unwrap_or(&empty);

  let league = text(obj, KEY_LEAGUE);
  let home_team = text(obj, KEY_HOME);
  let away_team = text(obj, KEY_AWAY);
  let raw_date = text(obj, KEY_DATE);

  let skip = |reason: &str| SkippedRow {
    confidence_level: confidence.to_owned(),
    index,
    league: league.clone(),
    home_team: home_team.clone(),
    away_team: away_team.clone(),
    kickoff: raw_date.clone(),
    reason: reason.to_owned(),
  };

  if !row.is_object() {
    return Err(skip("row is not an object"));
  }
  let Some(league_name) = league.clone() else {
    return Err(skip("missing league"));
  };
  let (Some(home), Some(away)) = (home_team.clone(), away_team.clone()) else {
    return Err(skip("missing team name"));
  };
  if home == away {
    return Err(skip("home and away team are the same"));
  }

  let kickoff = match raw_date.as_deref() {
    None => now,
    Some(raw) => parse_kickoff(raw).ok_or_else(|| skip("unparseable date"))?,
  };

  let status = match text(obj, KEY_STATUS) {
    None => None,
    Some(raw) => Some(
      raw
        .to_ascii_lowercase()
        .parse::<MatchStatus>()
        .map_err(|_| skip("unknown match status"))?,
    ),
  };

  let tips = obj
    .get(KEY_TIPS)
    .and_then(Value::as_object)
    .map(|markets| {
      markets
        .iter()
        .filter_map(|(code, value)| MarketTip::decode(code, value))
        .collect()
    })
    .unwrap_or_default();

  Ok(MatchRow {
    confidence: confidence.to_owned(),
    index,
    league: league_name,
    country: text(obj, KEY_COUNTRY),
    home_team: home,
    away_team: away,
    kickoff,
    venue: text(obj, KEY_VENUE),
    status,
    score_home: obj.get(KEY_SCORE_HOME).and_then(integer),
    score_away: obj.get(KEY_SCORE_AWAY).and_then(integer),
    jackpot: text(obj, KEY_JACKPOT),
    tips,
  })
}

/// A trimmed, non-empty string field. Numbers are accepted and stringified
/// since some feeds send numeric team or jackpot identifiers.
fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
  let s = match obj.get(key)? {
    Value::String(s) => s.trim().to_owned(),
    Value::Number(n) => n.to_string(),
    _ => return None,
  };
  (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use serde_json::json;

  use super::*;
  use crate::market::MarketCode;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() }

  #[test]
  fn concrete_scenario_decodes() {
    let doc = json!({
      "max": [{
        "league": "EPL", "Home Team": "A", "Away Team": "B", "date": "2025-01-01",
        "tips": { "1_X_2": { "odds": 1.9, "result": 1 } }
      }]
    });
    let payload = IngestPayload::decode(&doc, now()).unwrap();
    assert!(payload.skipped.is_empty());
    assert_eq!(payload.rows.len(), 1);

    let row = &payload.rows[0];
    assert_eq!(row.confidence, "max");
    assert_eq!(row.league, "EPL");
    assert_eq!(row.kickoff, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(row.status, None);
    assert_eq!(row.tips.len(), 1);
    assert_eq!(row.tips[0].market(), MarketCode::FullTime);
  }

  #[test]
  fn missing_away_team_is_skipped_with_context() {
    let doc = json!({
      "avg": [
        { "league": "EPL", "Home Team": "A", "Away Team": "B" },
        { "league": "La Liga", "Home Team": "Betis", "date": "2025-02-02" },
      ]
    });
    let payload = IngestPayload::decode(&doc, now()).unwrap();
    assert_eq!(payload.rows.len(), 1);
    assert_eq!(payload.skipped, vec![SkippedRow {
      confidence_level: "avg".into(),
      index:            1,
      league:           Some("La Liga".into()),
      home_team:        Some("Betis".into()),
      away_team:        None,
      kickoff:          Some("2025-02-02".into()),
      reason:           "missing team name".into(),
    }]);
  }

  #[test]
  fn absent_date_defaults_to_now() {
    let doc = json!({ "min": [{ "league": "L", "Home Team": "A", "Away Team": "B" }] });
    let payload = IngestPayload::decode(&doc, now()).unwrap();
    assert_eq!(payload.rows[0].kickoff, now());
  }

  #[test]
  fn invalid_rows_are_skipped_not_fatal() {
    let doc = json!({
      "max": [
        "not a row",
        { "Home Team": "A", "Away Team": "B" },
        { "league": "L", "Home Team": "A", "Away Team": "A" },
        { "league": "L", "Home Team": "A", "Away Team": "B", "date": "soon" },
        { "league": "L", "Home Team": "A", "Away Team": "B", "status": "abandoned" },
        { "league": "L", "Home Team": "  ", "Away Team": "B" },
      ]
    });
    let payload = IngestPayload::decode(&doc, now()).unwrap();
    assert!(payload.rows.is_empty());
    let reasons: Vec<_> = payload.skipped.iter().map(|s| s.reason.as_str()).collect();
    assert_eq!(reasons, [
      "row is not an object",
      "missing league",
      "home and away team are the same",
      "unparseable date",
      "unknown match status",
      "missing team name",
    ]);
    let indexes: Vec<_> = payload.skipped.iter().map(|s| s.index).collect();
    assert_eq!(indexes, [0, 1, 2, 3, 4, 5]);
  }

  #[test]
  fn bucket_order_is_preserved() {
    let doc = json!({
      "max": [{ "league": "L", "Home Team": "A", "Away Team": "B" }],
      "avg": [{ "league": "L", "Home Team": "C", "Away Team": "D" }],
      "min": [{ "league": "L", "Home Team": "E", "Away Team": "F" }],
    });
    let payload = IngestPayload::decode(&doc, now()).unwrap();
    let buckets: Vec<_> = payload.rows.iter().map(|r| r.confidence.as_str()).collect();
    assert_eq!(buckets, ["max", "avg", "min"]);
  }

  #[test]
  fn optional_fields_are_carried() {
    let doc = json!({
      "max": [{
        "league": "L", "Home Team": "A", "Away Team": "B",
        "venue": "Anfield", "status": "Finished", "score_home": 2, "score_away": "1",
        "jackpot": "SPMJ",
        "tips": { "unknown": {}, "1_X_2": { "result": 1 }, "GG_NG": { "odds": 1.6, "result": -1 } }
      }]
    });
    let row = &IngestPayload::decode(&doc, now()).unwrap().rows[0];
    assert_eq!(row.venue.as_deref(), Some("Anfield"));
    assert_eq!(row.status, Some(MatchStatus::Finished));
    assert_eq!((row.score_home, row.score_away), (Some(2), Some(1)));
    assert_eq!(row.jackpot.as_deref(), Some("SPMJ"));
    assert_eq!(row.tips.len(), 1);
    assert_eq!(row.tips[0].market(), MarketCode::BothTeamsScore);
  }

  #[test]
  fn non_object_payload_is_rejected() {
    assert!(matches!(
      IngestPayload::decode(&json!([1, 2]), now()),
      Err(Error::PayloadNotObject)
    ));
    assert!(matches!(
      IngestPayload::from_slice(b"{not json", now()),
      Err(Error::Serialization(_))
    ));
  }

  #[test]
  fn non_array_bucket_is_ignored() {
    let payload = IngestPayload::decode(&json!({ "max": { "league": "L" } }), now()).unwrap();
    assert!(payload.rows.is_empty());
    assert_eq!(payload.ignored_buckets, ["max"]);
  }
}
