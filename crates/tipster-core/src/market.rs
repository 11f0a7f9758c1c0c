//! Prediction markets and the fixed pick-label mapping tables.
//!
//! External payloads key their predictions by market code. Each market's
//! sub-object is decoded into a [`MarketTip`] variant before anything is
//! persisted, so malformed shapes are rejected up front instead of being
//! probed at insert time.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

// ─── Market codes ────────────────────────────────────────────────────────────

/// The market a tip predicts on. The string codes are stored verbatim in the
/// `prediction_type` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::EnumString,
  strum::IntoStaticStr,
)]
pub enum MarketCode {
  /// Full-time result: home, draw, away.
  #[serde(rename = "1_X_2")]
  #[strum(serialize = "1_X_2")]
  FullTime,
  #[serde(rename = "1X_X2_12")]
  #[strum(serialize = "1X_X2_12")]
  DoubleChance,
  /// Both teams to score.
  #[serde(rename = "GG_NG")]
  #[strum(serialize = "GG_NG")]
  BothTeamsScore,
  #[serde(rename = "Over/Under")]
  #[strum(serialize = "Over/Under")]
  OverUnder,
}

impl MarketCode {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Pick label for a signed result on a sign market.
  ///
  /// | market     |  1   |  0   |  -1  |
  /// |------------|------|------|------|
  /// | `1_X_2`    | `1`  | `x`  | `2`  |
  /// | `1X_X2_12` | `1X` | `X2` | `12` |
  /// | `GG_NG`    | `NG` |  –   | `GG` |
  ///
  /// Returns `None` for anything else, including every over/under result.
  pub fn sign_pick(self, result: i64) -> Option<&'static str> {
    match (self, result) {
      (Self::FullTime, 1) => Some("1"),
      (Self::FullTime, 0) => Some("x"),
      (Self::FullTime, -1) => Some("2"),
      (Self::DoubleChance, 1) => Some("1X"),
      (Self::DoubleChance, 0) => Some("X2"),
      (Self::DoubleChance, -1) => Some("12"),
      (Self::BothTeamsScore, -1) => Some("GG"),
      (Self::BothTeamsScore, 1) => Some("NG"),
      _ => None,
    }
  }
}

impl fmt::Display for MarketCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Threshold ───────────────────────────────────────────────────────────────

/// An over/under goal line held as fixed-point hundredths, so `2.5` and
/// `2.25` both survive storage without rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u32);

impl Threshold {
  pub fn hundredths(self) -> u32 { self.0 }
}

impl FromStr for Threshold {
  type Err = Error;

  fn from_str(raw: &str) -> Result<Self> {
    let invalid = || Error::InvalidThreshold(raw.to_owned());
    let s = raw.trim();
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

    if whole.is_empty()
      || frac.len() > 2
      || !whole.bytes().all(|b| b.is_ascii_digit())
      || !frac.bytes().all(|b| b.is_ascii_digit())
    {
      return Err(invalid());
    }

    let whole: u32 = whole.parse().map_err(|_| invalid())?;
    let frac: u32 = match frac.len() {
      0 => 0,
      1 => frac.parse::<u32>().map_err(|_| invalid())? * 10,
      _ => frac.parse().map_err(|_| invalid())?,
    };

    whole
      .checked_mul(100)
      .and_then(|w| w.checked_add(frac))
      .map(Self)
      .ok_or_else(invalid)
  }
}

impl fmt::Display for Threshold {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (whole, frac) = (self.0 / 100, self.0 % 100);
    if frac == 0 {
      write!(f, "{whole}")
    } else if frac % 10 == 0 {
      write!(f, "{whole}.{}", frac / 10)
    } else {
      write!(f, "{whole}.{frac:02}")
    }
  }
}

// ─── Decoded market payloads ─────────────────────────────────────────────────

/// A sign-market prediction: one odds value and a signed result.
#[derive(Debug, Clone, PartialEq)]
pub struct SignTip {
  pub odds:   f64,
  pub result: i64,
}

/// One over/under line: a threshold with separate odds for each side.
#[derive(Debug, Clone, PartialEq)]
pub struct OverUnderLine {
  pub threshold:  Threshold,
  pub over_odds:  f64,
  pub under_odds: f64,
  /// Carried through from the payload; it does not select between the two
  /// picks, both are always produced.
  pub result:     Option<i64>,
}

/// A market sub-object from the ingestion payload, validated per market.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketTip {
  FullTime(SignTip),
  DoubleChance(SignTip),
  BothTeamsScore(SignTip),
  OverUnder(Vec<OverUnderLine>),
}

/// A normalised pick ready to be upserted as a tip row.
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
  pub prediction_type:  MarketCode,
  pub prediction_value: String,
  pub pick_label:       String,
  pub odds:             f64,
}

impl MarketTip {
  /// Decode the sub-object stored under market key `code`.
  ///
  /// Returns `None` when the market is unknown, the odds are missing or not
  /// numeric, or the result does not map to a pick. Such entries are skipped
  /// without being reported.
  pub fn decode(code: &str, value: &Value) -> Option<Self> {
    let market: MarketCode = code.trim().parse().ok()?;
    match market {
      MarketCode::OverUnder => {
        let lines: Vec<OverUnderLine> = value
          .as_object()?
          .iter()
          .filter_map(|(threshold, line)| decode_line(threshold, line))
          .collect();
        (!lines.is_empty()).then_some(Self::OverUnder(lines))
      }
      sign => {
        let obj = value.as_object()?;
        let odds = obj.get("odds").and_then(number)?;
        let result = obj.get("result").and_then(integer)?;
        sign.sign_pick(result)?;
        let tip = SignTip { odds, result };
        Some(match sign {
          MarketCode::FullTime => Self::FullTime(tip),
          MarketCode::DoubleChance => Self::DoubleChance(tip),
          _ => Self::BothTeamsScore(tip),
        })
      }
    }
  }

  pub fn market(&self) -> MarketCode {
    match self {
      Self::FullTime(_) => MarketCode::FullTime,
      Self::DoubleChance(_) => MarketCode::DoubleChance,
      Self::BothTeamsScore(_) => MarketCode::BothTeamsScore,
      Self::OverUnder(_) => MarketCode::OverUnder,
    }
  }

  /// Expand into the tip rows this prediction produces, in payload order.
  pub fn picks(&self) -> Vec<Pick> {
    let market = self.market();
    match self {
      Self::FullTime(tip) | Self::DoubleChance(tip) | Self::BothTeamsScore(tip) => market
        .sign_pick(tip.result)
        .map(|label| Pick {
          prediction_type:  market,
          prediction_value: tip.result.to_string(),
          pick_label:       label.to_owned(),
          odds:             tip.odds,
        })
        .into_iter()
        .collect(),
      Self::OverUnder(lines) => lines
        .iter()
        .flat_map(|line| {
          let value = line.threshold.to_string();
          [("Over", line.over_odds), ("Under", line.under_odds)].map(|(side, odds)| Pick {
            prediction_type: market,
            prediction_value: value.clone(),
            pick_label: format!("{side} {value}"),
            odds,
          })
        })
        .collect(),
    }
  }
}

fn decode_line(threshold: &str, line: &Value) -> Option<OverUnderLine> {
  let threshold: Threshold = threshold.parse().ok()?;
  let obj = line.as_object()?;
  let odds = obj.get("odds")?.as_array()?;
  let [over, under] = odds.as_slice() else {
    return None;
  };
  Some(OverUnderLine {
    threshold,
    over_odds: number(over)?,
    under_odds: number(under)?,
    result: obj.get("result").and_then(integer),
  })
}

/// A JSON number, or a string holding one.
pub(crate) fn number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

/// A JSON integer, a float with no fractional part, or a string holding one.
pub(crate) fn integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn labels(tip: &MarketTip) -> Vec<String> {
    tip.picks().into_iter().map(|p| p.pick_label).collect()
  }

  #[test]
  fn full_time_table() {
    assert_eq!(MarketCode::FullTime.sign_pick(1), Some("1"));
    assert_eq!(MarketCode::FullTime.sign_pick(0), Some("x"));
    assert_eq!(MarketCode::FullTime.sign_pick(-1), Some("2"));
    assert_eq!(MarketCode::FullTime.sign_pick(2), None);
  }

  #[test]
  fn double_chance_and_btts_tables() {
    assert_eq!(MarketCode::DoubleChance.sign_pick(1), Some("1X"));
    assert_eq!(MarketCode::DoubleChance.sign_pick(0), Some("X2"));
    assert_eq!(MarketCode::DoubleChance.sign_pick(-1), Some("12"));
    assert_eq!(MarketCode::BothTeamsScore.sign_pick(-1), Some("GG"));
    assert_eq!(MarketCode::BothTeamsScore.sign_pick(1), Some("NG"));
    assert_eq!(MarketCode::BothTeamsScore.sign_pick(0), None);
  }

  #[test]
  fn decode_sign_market() {
    let tip = MarketTip::decode("1_X_2", &json!({ "odds": 1.9, "result": 1 })).unwrap();
    assert_eq!(tip.market(), MarketCode::FullTime);
    let picks = tip.picks();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].pick_label, "1");
    assert_eq!(picks[0].prediction_value, "1");
    assert_eq!(picks[0].odds, 1.9);
  }

  #[test]
  fn decode_rejects_missing_odds_and_bad_result() {
    assert!(MarketTip::decode("1_X_2", &json!({ "result": 1 })).is_none());
    assert!(MarketTip::decode("1_X_2", &json!({ "odds": 1.5, "result": 3 })).is_none());
    assert!(MarketTip::decode("GG_NG", &json!({ "odds": 1.5, "result": 0 })).is_none());
    assert!(MarketTip::decode("HT_FT", &json!({ "odds": 1.5, "result": 1 })).is_none());
  }

  #[test]
  fn decode_accepts_numeric_strings() {
    let tip = MarketTip::decode("GG_NG", &json!({ "odds": "1.75", "result": "-1" })).unwrap();
    assert_eq!(labels(&tip), ["GG"]);
  }

  #[test]
  fn over_under_produces_both_sides() {
    let tip = MarketTip::decode(
      "Over/Under",
      &json!({ "2.5": { "odds": [1.8, 2.05], "result": 1 } }),
    )
    .unwrap();
    let picks = tip.picks();
    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0].pick_label, "Over 2.5");
    assert_eq!(picks[0].odds, 1.8);
    assert_eq!(picks[1].pick_label, "Under 2.5");
    assert_eq!(picks[1].odds, 2.05);
    assert!(picks.iter().all(|p| p.prediction_value == "2.5"));
  }

  #[test]
  fn over_under_skips_malformed_lines() {
    let tip = MarketTip::decode(
      "Over/Under",
      &json!({
        "1.5": { "odds": [1.2] },
        "abc": { "odds": [1.2, 3.4] },
        "3.5": { "odds": [2.4, 1.5] },
      }),
    )
    .unwrap();
    assert_eq!(labels(&tip), ["Over 3.5", "Under 3.5"]);

    assert!(MarketTip::decode("Over/Under", &json!({ "2.5": { "odds": 1.8 } })).is_none());
  }

  #[test]
  fn threshold_is_lossless() {
    for (raw, canon, hundredths) in [
      ("2.5", "2.5", 250),
      ("2.50", "2.5", 250),
      ("2", "2", 200),
      ("2.25", "2.25", 225),
      ("0.05", "0.05", 5),
      (" 3.5 ", "3.5", 350),
    ] {
      let t: Threshold = raw.parse().unwrap();
      assert_eq!(t.hundredths(), hundredths, "{raw}");
      assert_eq!(t.to_string(), canon, "{raw}");
    }
  }

  #[test]
  fn threshold_rejects_junk() {
    for raw in ["", ".5", "2.125", "-1.5", "2,5", "two"] {
      assert!(raw.parse::<Threshold>().is_err(), "{raw}");
    }
  }

  #[test]
  fn market_codes_parse_verbatim() {
    assert_eq!("Over/Under".parse::<MarketCode>().unwrap(), MarketCode::OverUnder);
    assert_eq!(MarketCode::DoubleChance.as_str(), "1X_X2_12");
    assert!("1x2".parse::<MarketCode>().is_err());
  }
}
