//! Plain-text rendering of API responses.

use std::fmt::Write as _;

use tipster_core::{
  display::TipDisplay, plan::SubscriptionPlan, subscription::UserPackage, tip::TipResult,
};

use crate::client::IngestSummary;

pub fn ingest(summary: &IngestSummary) -> String {
  let mut out = format!("{}\n", summary.message);
  for skip in &summary.report.skipped {
    let _ = writeln!(
      out,
      "  skipped {}[{}] {} vs {}: {}",
      skip.confidence_level,
      skip.index,
      skip.home_team.as_deref().unwrap_or("?"),
      skip.away_team.as_deref().unwrap_or("?"),
      skip.reason,
    );
  }
  for a in &summary.report.assignments {
    let _ = writeln!(out, "  {} +{}", a.plan_name, a.added_tips);
  }
  out
}

pub fn plans(plans: &[SubscriptionPlan]) -> String {
  let mut out = String::new();
  for p in plans {
    let _ = writeln!(
      out,
      "{:>4}  {:<28} {:>9.2} {}  every {} {}  ({} tips)",
      p.id,
      p.name,
      p.price,
      p.currency,
      p.interval_count,
      p.interval.as_str(),
      p.features.tips_list.len(),
    );
  }
  out
}

fn status(result: Option<TipResult>) -> &'static str { result.map_or("-", TipResult::as_str) }

pub fn tips(tips: &[TipDisplay]) -> String {
  let mut out = String::new();
  for t in tips {
    let _ = writeln!(
      out,
      "{:>5}  {}  {:<36} {:<12} {:<10} {:<5} {}",
      t.id,
      t.time,
      t.match_label,
      t.tip_type.as_str(),
      t.prediction,
      t.risk_level.as_str(),
      status(t.winning_status),
    );
  }
  out
}

pub fn packages(packages: &[UserPackage]) -> String {
  let mut out = String::new();
  for p in packages {
    let state = if p.is_active { "active" } else { p.subscription.status.as_str() };
    let until = p
      .subscription
      .end_at
      .map_or_else(|| "open-ended".to_owned(), |d| d.format("%Y-%m-%d").to_string());
    let _ = writeln!(out, "{} [{state}] until {until}", p.plan_name);
    for line in tips(&p.tips).lines() {
      let _ = writeln!(out, "  {line}");
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use tipster_core::{market::MarketCode, tip::RiskLevel};

  use super::*;

  fn tip(result: Option<TipResult>) -> TipDisplay {
    TipDisplay {
      id:             7,
      match_label:    "Arsenal vs Chelsea".into(),
      home_team:      "Arsenal".into(),
      away_team:      "Chelsea".into(),
      league:         "EPL".into(),
      prediction:     "1X".into(),
      tip_type:       MarketCode::DoubleChance,
      risk_level:     RiskLevel::Mid,
      winning_status: result,
      time:           "17:30".into(),
    }
  }

  #[test]
  fn tip_line_shows_pick_and_status() {
    let out = tips(&[tip(None), tip(Some(TipResult::Won))]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Arsenal vs Chelsea"));
    assert!(lines[0].contains("1X_X2_12"));
    assert!(lines[0].trim_end().ends_with('-'));
    assert!(lines[1].trim_end().ends_with("won"));
  }
}
