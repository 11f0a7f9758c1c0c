//! The tip display record shown in package and plan views.
//!
//! Every read path that turns a stored list of tip IDs into something a user
//! sees goes through [`TipDisplay::from_detail`] and [`resolve_in_order`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  market::MarketCode,
  tip::{RiskLevel, Tip, TipResult},
};

/// A tip joined with the names it is displayed under.
#[derive(Debug, Clone, PartialEq)]
pub struct TipDetail {
  pub tip:        Tip,
  pub home_team:  String,
  pub away_team:  String,
  pub league:     String,
  pub kickoff_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipDisplay {
  pub id:             i64,
  /// `"Home vs Away"`.
  #[serde(rename = "match")]
  pub match_label:    String,
  pub home_team:      String,
  pub away_team:      String,
  pub league:         String,
  /// The pick label.
  pub prediction:     String,
  pub tip_type:       MarketCode,
  pub risk_level:     RiskLevel,
  /// `None` until the tip is settled.
  pub winning_status: Option<TipResult>,
  /// Kickoff as `HH:mm` (UTC).
  pub time:           String,
}

impl TipDisplay {
  pub fn from_detail(detail: &TipDetail) -> Self {
    let tip = &detail.tip;
    Self {
      id:             tip.id,
      match_label:    format!("{} vs {}", detail.home_team, detail.away_team),
      home_team:      detail.home_team.clone(),
      away_team:      detail.away_team.clone(),
      league:         detail.league.clone(),
      prediction:     tip.pick_label.clone(),
      tip_type:       tip.prediction_type,
      risk_level:     tip.risk_level,
      winning_status: tip.result.is_final().then_some(tip.result),
      time:           detail.kickoff_at.format("%H:%M").to_string(),
    }
  }
}

/// Map `details` onto `ids`, keeping the order of `ids` and silently dropping
/// IDs with no matching detail (deleted or never created tips).
pub fn resolve_in_order(ids: &[i64], details: Vec<TipDetail>) -> Vec<TipDisplay> {
  let by_id: HashMap<i64, TipDetail> =
    details.into_iter().map(|d| (d.tip.id, d)).collect();
  ids
    .iter()
    .filter_map(|id| by_id.get(id))
    .map(TipDisplay::from_detail)
    .collect()
}

#[cfg(test)]
pub(crate) mod tests {
  use chrono::TimeZone as _;
  use serde_json::json;

  use super::*;
  use crate::tip::{TipStatus, Visibility};

  pub(crate) fn detail(id: i64, label: &str) -> TipDetail {
    let kickoff = Utc.with_ymd_and_hms(2025, 1, 1, 19, 45, 0).unwrap();
    TipDetail {
      tip:        Tip {
        id,
        match_id: 1,
        author_id: None,
        prediction_type: MarketCode::FullTime,
        prediction_value: "1".into(),
        pick_label: label.into(),
        odds: 1.9,
        risk_level: RiskLevel::High,
        is_free: false,
        free_for_date: None,
        visibility: Visibility::Premium,
        publish_at: kickoff,
        status: TipStatus::Pending,
        result: TipResult::Pending,
        settled_at: None,
      },
      home_team:  "Arsenal".into(),
      away_team:  "Chelsea".into(),
      league:     "EPL".into(),
      kickoff_at: kickoff,
    }
  }

  #[test]
  fn display_shape() {
    let display = TipDisplay::from_detail(&detail(5, "1"));
    assert_eq!(
      serde_json::to_value(&display).unwrap(),
      json!({
        "id": 5,
        "match": "Arsenal vs Chelsea",
        "homeTeam": "Arsenal",
        "awayTeam": "Chelsea",
        "league": "EPL",
        "prediction": "1",
        "tipType": "1_X_2",
        "riskLevel": "high",
        "winningStatus": null,
        "time": "19:45",
      })
    );
  }

  #[test]
  fn settled_tip_reports_result() {
    let mut d = detail(5, "1");
    d.tip.status = TipStatus::Settled;
    d.tip.result = TipResult::Won;
    assert_eq!(TipDisplay::from_detail(&d).winning_status, Some(TipResult::Won));
  }

  #[test]
  fn missing_ids_are_dropped() {
    let details = vec![detail(1, "1"), detail(3, "x")];
    let resolved = resolve_in_order(&[3, 2, 1], details);
    let ids: Vec<_> = resolved.iter().map(|d| d.id).collect();
    assert_eq!(ids, [3, 1]);
  }
}
