//! Subscription plans, their `features` blob, and the plan-tip assignment
//! rules.
//!
//! Each plan stores an ordered `tips_list` inside its JSON `features` column.
//! New tips are appended by the assignment engine according to a fixed rule
//! table: one rule per plan name, giving the cap, the single market the plan
//! carries, and optional jackpot-tag and confidence-bucket filters.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::market::MarketCode;

// ─── Billing interval ────────────────────────────────────────────────────────

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
pub enum BillingInterval {
  Day,
  Week,
  #[default]
  Month,
  Year,
}

impl BillingInterval {
  pub fn as_str(self) -> &'static str { self.into() }

  /// `from` advanced by `count` intervals. Month arithmetic clamps to the end
  /// of shorter months. Returns `None` on overflow.
  pub fn advance(self, from: DateTime<Utc>, count: u32) -> Option<DateTime<Utc>> {
    match self {
      Self::Day => from.checked_add_signed(TimeDelta::try_days(i64::from(count))?),
      Self::Week => from.checked_add_signed(TimeDelta::try_weeks(i64::from(count))?),
      Self::Month => from.checked_add_months(Months::new(count)),
      Self::Year => from.checked_add_months(Months::new(count.checked_mul(12)?)),
    }
  }
}

// ─── Features ────────────────────────────────────────────────────────────────

/// The `features` JSON column of a plan.
///
/// `tips_list` is ordered and duplicate-free; every other key (category, tax,
/// label, …) is preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFeatures {
  #[serde(default)]
  pub tips_list: Vec<i64>,
  #[serde(flatten)]
  pub extra:     Map<String, Value>,
}

impl PlanFeatures {
  /// Append `candidates` in order while the list is shorter than `cap`,
  /// skipping IDs already present. Returns how many were appended.
  pub fn append_capped(&mut self, candidates: &[i64], cap: Option<usize>) -> usize {
    let mut added = 0;
    for &id in candidates {
      if cap.is_some_and(|cap| self.tips_list.len() >= cap) {
        break;
      }
      if !self.tips_list.contains(&id) {
        self.tips_list.push(id);
        added += 1;
      }
    }
    added
  }

  /// Replace the list, dropping repeated IDs but keeping first-seen order.
  pub fn replace_tips(&mut self, ids: &[i64]) {
    self.tips_list.clear();
    for &id in ids {
      if !self.tips_list.contains(&id) {
        self.tips_list.push(id);
      }
    }
  }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
  pub id:             i64,
  pub name:           String,
  pub slug:           String,
  pub price:          f64,
  pub currency:       String,
  pub interval:       BillingInterval,
  pub interval_count: u32,
  pub features:       PlanFeatures,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::TipStore::create_plan`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
  pub name:           String,
  pub price:          f64,
  #[serde(default = "default_currency")]
  pub currency:       String,
  #[serde(default)]
  pub interval:       BillingInterval,
  #[serde(default = "default_interval_count")]
  pub interval_count: u32,
  #[serde(default)]
  pub features:       PlanFeatures,
}

fn default_currency() -> String { "KES".to_owned() }

fn default_interval_count() -> u32 { 1 }

// ─── Rules ───────────────────────────────────────────────────────────────────

/// One row of the plan-tip assignment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRule {
  pub plan_name:   String,
  /// `None` means unbounded.
  pub max_tips:    Option<usize>,
  pub tip_type:    MarketCode,
  /// `None` applies regardless of the row's jackpot tag.
  pub jackpot_tag: Option<String>,
  /// `None` applies to every confidence bucket.
  pub confidence:  Option<String>,
}

impl PlanRule {
  fn new(
    plan_name: &str,
    max_tips: Option<usize>,
    tip_type: MarketCode,
    jackpot_tag: Option<&str>,
    confidence: Option<&str>,
  ) -> Self {
    Self {
      plan_name: plan_name.to_owned(),
      max_tips,
      tip_type,
      jackpot_tag: jackpot_tag.map(str::to_owned),
      confidence: confidence.map(str::to_owned),
    }
  }

  /// Whether this rule applies to tips from a row in `confidence` carrying
  /// `jackpot`. Tags compare case-insensitively.
  pub fn applies_to(&self, confidence: &str, jackpot: Option<&str>) -> bool {
    let tag_ok = match (&self.jackpot_tag, jackpot) {
      (None, _) => true,
      (Some(want), Some(got)) => want.eq_ignore_ascii_case(got.trim()),
      (Some(_), None) => false,
    };
    let bucket_ok = self.confidence.as_deref().is_none_or(|want| want == confidence);
    tag_ok && bucket_ok
  }
}

/// The built-in rule table seeded into a fresh store.
pub fn default_rules() -> Vec<PlanRule> {
  use MarketCode::*;
  vec![
    PlanRule::new("Daily 1X2", Some(5), FullTime, None, None),
    PlanRule::new("Double Chance", Some(5), DoubleChance, None, None),
    PlanRule::new("Both Teams To Score", Some(5), BothTeamsScore, None, None),
    PlanRule::new("Over/Under Goals", Some(6), OverUnder, None, None),
    PlanRule::new("Premium Max", Some(3), FullTime, None, Some("max")),
    PlanRule::new("SportPesa Mega Jackpot", None, FullTime, Some("SPMJ"), None),
    PlanRule::new("SportPesa Midweek Jackpot", None, FullTime, Some("SPMWJ"), None),
    PlanRule::new("Betika Grand Jackpot", None, FullTime, Some("BGJ"), None),
  ]
}

/// Input to [`crate::store::TipStore::assign_tips`]: replay the assignment
/// engine for a list of existing tips.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRequest {
  pub tip_ids:    Vec<i64>,
  pub confidence: String,
  #[serde(default)]
  pub jackpot:    Option<String>,
}

/// What the assignment engine did to one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAssignment {
  pub plan_id:    i64,
  pub plan_name:  String,
  pub added_tips: usize,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use serde_json::json;

  use super::*;

  #[test]
  fn cap_blocks_additions_when_full() {
    let mut features = PlanFeatures { tips_list: vec![1, 2], ..Default::default() };
    assert_eq!(features.append_capped(&[3, 4, 5], Some(2)), 0);
    assert_eq!(features.tips_list, [1, 2]);
  }

  #[test]
  fn cap_allows_partial_fill() {
    let mut features = PlanFeatures { tips_list: vec![1], ..Default::default() };
    assert_eq!(features.append_capped(&[2, 3, 4], Some(3)), 2);
    assert_eq!(features.tips_list, [1, 2, 3]);
  }

  #[test]
  fn duplicates_are_not_appended() {
    let mut features = PlanFeatures { tips_list: vec![7], ..Default::default() };
    assert_eq!(features.append_capped(&[7, 8, 8], None), 1);
    assert_eq!(features.tips_list, [7, 8]);
  }

  #[test]
  fn unbounded_rule_takes_everything() {
    let mut features = PlanFeatures::default();
    let ids: Vec<i64> = (1..=40).collect();
    assert_eq!(features.append_capped(&ids, None), 40);
  }

  #[test]
  fn features_preserve_unknown_keys() {
    let raw = json!({ "tips_list": [3, 1], "category": "jackpot", "tax": 16 });
    let features: PlanFeatures = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(features.tips_list, [3, 1]);
    assert_eq!(features.extra.get("category"), Some(&json!("jackpot")));
    assert_eq!(serde_json::to_value(&features).unwrap(), raw);
  }

  #[test]
  fn features_without_list_default_empty() {
    let features: PlanFeatures = serde_json::from_value(json!({ "label": "x" })).unwrap();
    assert!(features.tips_list.is_empty());
  }

  #[test]
  fn replace_tips_dedups_in_order() {
    let mut features = PlanFeatures { tips_list: vec![9], ..Default::default() };
    features.replace_tips(&[4, 2, 4, 1, 2]);
    assert_eq!(features.tips_list, [4, 2, 1]);
  }

  #[test]
  fn rule_matching() {
    let rules = default_rules();
    let find = |name: &str| rules.iter().find(|r| r.plan_name == name).unwrap();

    assert!(find("Daily 1X2").applies_to("min", None));
    assert!(find("Daily 1X2").applies_to("max", Some("SPMJ")));
    assert!(find("SportPesa Mega Jackpot").applies_to("avg", Some("spmj")));
    assert!(!find("SportPesa Mega Jackpot").applies_to("avg", None));
    assert!(!find("SportPesa Mega Jackpot").applies_to("avg", Some("BGJ")));
    assert!(find("Premium Max").applies_to("max", None));
    assert!(!find("Premium Max").applies_to("avg", None));
  }

  #[test]
  fn intervals_advance() {
    let start = Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
    assert_eq!(
      BillingInterval::Month.advance(start, 1),
      Some(Utc.with_ymd_and_hms(2025, 2, 28, 10, 0, 0).unwrap())
    );
    assert_eq!(
      BillingInterval::Week.advance(start, 2),
      Some(Utc.with_ymd_and_hms(2025, 2, 14, 10, 0, 0).unwrap())
    );
    assert_eq!(
      BillingInterval::Year.advance(start, 1),
      Some(Utc.with_ymd_and_hms(2026, 1, 31, 10, 0, 0).unwrap())
    );
  }
}
