//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings truncated to the second so
//! they compare correctly as natural keys. Dates are `YYYY-MM-DD`. Enums are
//! stored as their string codes; plan features as compact JSON.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use tipster_core::{
  access::{AccessSource, TipAccess, Transaction, TransactionKind, TransactionStatus},
  display::TipDetail,
  fixture::{Match, MatchStatus},
  market::MarketCode,
  plan::{BillingInterval, PlanFeatures, PlanRule, SubscriptionPlan},
  subscription::{Subscription, SubscriptionStatus, User},
  tip::{RiskLevel, Tip, TipResult, TipStatus, Visibility},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Secs, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

/// Parse a stored enum code.
pub fn decode_code<T: FromStr>(kind: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {kind}: {s:?}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_features(f: &PlanFeatures) -> Result<String> { Ok(serde_json::to_string(f)?) }

pub fn decode_features(s: &str) -> Result<PlanFeatures> { Ok(serde_json::from_str(s)?) }

// ─── Column lists ────────────────────────────────────────────────────────────

/// Columns read by [`RawTip::from_row`], aliased on `t`.
macro_rules! tip_columns {
  () => {
    "t.id, t.match_id, t.author_id, t.prediction_type, t.prediction_value, \
     t.pick_label, t.odds, t.risk_level, t.is_free, t.free_for_date, \
     t.visibility, t.publish_at, t.status, t.result, t.settled_at"
  };
}
pub(crate) use tip_columns;

pub const TIP_COLUMN_COUNT: usize = 15;

pub const MATCH_COLUMNS: &str = "id, league_id, home_team_id, away_team_id, kickoff_at, venue, \
                                 status, score_home, score_away, tip_confidence";

pub const PLAN_COLUMNS: &str =
  "id, name, slug, price, currency, billing_interval, interval_count, features, created_at";

/// Columns read by [`RawSubscription::from_row`], aliased on `s`.
pub const SUBSCRIPTION_COLUMNS: &str =
  "s.id, s.user_id, s.plan_id, s.status, s.start_at, s.end_at, s.renews_at, s.auto_renew";

pub const TRANSACTION_COLUMNS: &str =
  "id, user_id, reference, amount, currency, kind, status, gateway, created_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `tips` row.
pub struct RawTip {
  pub id:               i64,
  pub match_id:         i64,
  pub author_id:        Option<i64>,
  pub prediction_type:  String,
  pub prediction_value: String,
  pub pick_label:       String,
  pub odds:             f64,
  pub risk_level:       String,
  pub is_free:          bool,
  pub free_for_date:    Option<String>,
  pub visibility:       String,
  pub publish_at:       String,
  pub status:           String,
  pub result:           String,
  pub settled_at:       Option<String>,
}

impl RawTip {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      match_id:         row.get(1)?,
      author_id:        row.get(2)?,
      prediction_type:  row.get(3)?,
      prediction_value: row.get(4)?,
      pick_label:       row.get(5)?,
      odds:             row.get(6)?,
      risk_level:       row.get(7)?,
      is_free:          row.get(8)?,
      free_for_date:    row.get(9)?,
      visibility:       row.get(10)?,
      publish_at:       row.get(11)?,
      status:           row.get(12)?,
      result:           row.get(13)?,
      settled_at:       row.get(14)?,
    })
  }

  pub fn into_tip(self) -> Result<Tip> {
    Ok(Tip {
      id:               self.id,
      match_id:         self.match_id,
      author_id:        self.author_id,
      prediction_type:  decode_code::<MarketCode>("market", &self.prediction_type)?,
      prediction_value: self.prediction_value,
      pick_label:       self.pick_label,
      odds:             self.odds,
      risk_level:       decode_code::<RiskLevel>("risk level", &self.risk_level)?,
      is_free:          self.is_free,
      free_for_date:    self.free_for_date.as_deref().map(decode_date).transpose()?,
      visibility:       decode_code::<Visibility>("visibility", &self.visibility)?,
      publish_at:       decode_dt(&self.publish_at)?,
      status:           decode_code::<TipStatus>("tip status", &self.status)?,
      result:           decode_code::<TipResult>("tip result", &self.result)?,
      settled_at:       decode_opt_dt(self.settled_at)?,
    })
  }
}

/// A tip row followed by home name, away name, league name and kickoff.
pub struct RawTipDetail {
  pub tip:        RawTip,
  pub home_team:  String,
  pub away_team:  String,
  pub league:     String,
  pub kickoff_at: String,
}

impl RawTipDetail {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let n = TIP_COLUMN_COUNT;
    Ok(Self {
      tip:        RawTip::from_row(row)?,
      home_team:  row.get(n)?,
      away_team:  row.get(n + 1)?,
      league:     row.get(n + 2)?,
      kickoff_at: row.get(n + 3)?,
    })
  }

  pub fn into_detail(self) -> Result<TipDetail> {
    Ok(TipDetail {
      tip:        self.tip.into_tip()?,
      home_team:  self.home_team,
      away_team:  self.away_team,
      league:     self.league,
      kickoff_at: decode_dt(&self.kickoff_at)?,
    })
  }
}

pub struct RawMatch {
  pub id:             i64,
  pub league_id:      i64,
  pub home_team_id:   i64,
  pub away_team_id:   i64,
  pub kickoff_at:     String,
  pub venue:          Option<String>,
  pub status:         String,
  pub score_home:     Option<i64>,
  pub score_away:     Option<i64>,
  pub tip_confidence: Option<String>,
}

impl RawMatch {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      league_id:      row.get(1)?,
      home_team_id:   row.get(2)?,
      away_team_id:   row.get(3)?,
      kickoff_at:     row.get(4)?,
      venue:          row.get(5)?,
      status:         row.get(6)?,
      score_home:     row.get(7)?,
      score_away:     row.get(8)?,
      tip_confidence: row.get(9)?,
    })
  }

  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      id:             self.id,
      league_id:      self.league_id,
      home_team_id:   self.home_team_id,
      away_team_id:   self.away_team_id,
      kickoff_at:     decode_dt(&self.kickoff_at)?,
      venue:          self.venue,
      status:         decode_code::<MatchStatus>("match status", &self.status)?,
      score_home:     self.score_home,
      score_away:     self.score_away,
      tip_confidence: self.tip_confidence,
    })
  }
}

pub struct RawPlan {
  pub id:             i64,
  pub name:           String,
  pub slug:           String,
  pub price:          f64,
  pub currency:       String,
  pub interval:       String,
  pub interval_count: u32,
  pub features:       String,
  pub created_at:     String,
}

impl RawPlan {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      name:           row.get(1)?,
      slug:           row.get(2)?,
      price:          row.get(3)?,
      currency:       row.get(4)?,
      interval:       row.get(5)?,
      interval_count: row.get(6)?,
      features:       row.get(7)?,
      created_at:     row.get(8)?,
    })
  }

  pub fn into_plan(self) -> Result<SubscriptionPlan> {
    Ok(SubscriptionPlan {
      id:             self.id,
      name:           self.name,
      slug:           self.slug,
      price:          self.price,
      currency:       self.currency,
      interval:       decode_code::<BillingInterval>("billing interval", &self.interval)?,
      interval_count: self.interval_count,
      features:       decode_features(&self.features)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawRule {
  pub plan_name:   String,
  pub max_tips:    Option<i64>,
  pub tip_type:    String,
  pub jackpot_tag: Option<String>,
  pub confidence:  Option<String>,
}

impl RawRule {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      plan_name:   row.get(0)?,
      max_tips:    row.get(1)?,
      tip_type:    row.get(2)?,
      jackpot_tag: row.get(3)?,
      confidence:  row.get(4)?,
    })
  }

  pub fn into_rule(self) -> Result<PlanRule> {
    Ok(PlanRule {
      plan_name:   self.plan_name,
      max_tips:    self.max_tips.map(|m| usize::try_from(m.max(0)).unwrap_or(usize::MAX)),
      tip_type:    decode_code::<MarketCode>("market", &self.tip_type)?,
      jackpot_tag: self.jackpot_tag,
      confidence:  self.confidence,
    })
  }
}

pub struct RawUser {
  pub id:         i64,
  pub email:      String,
  pub name:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      email:      row.get(1)?,
      name:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      email:      self.email,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawSubscription {
  pub id:         i64,
  pub user_id:    i64,
  pub plan_id:    i64,
  pub status:     String,
  pub start_at:   String,
  pub end_at:     Option<String>,
  pub renews_at:  Option<String>,
  pub auto_renew: bool,
}

impl RawSubscription {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      plan_id:    row.get(2)?,
      status:     row.get(3)?,
      start_at:   row.get(4)?,
      end_at:     row.get(5)?,
      renews_at:  row.get(6)?,
      auto_renew: row.get(7)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      id:         self.id,
      user_id:    self.user_id,
      plan_id:    self.plan_id,
      status:     decode_code::<SubscriptionStatus>("subscription status", &self.status)?,
      start_at:   decode_dt(&self.start_at)?,
      end_at:     decode_opt_dt(self.end_at)?,
      renews_at:  decode_opt_dt(self.renews_at)?,
      auto_renew: self.auto_renew,
    })
  }
}

pub struct RawTransaction {
  pub id:         i64,
  pub user_id:    i64,
  pub reference:  String,
  pub amount:     f64,
  pub currency:   String,
  pub kind:       String,
  pub status:     String,
  pub gateway:    String,
  pub created_at: String,
}

impl RawTransaction {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      reference:  row.get(2)?,
      amount:     row.get(3)?,
      currency:   row.get(4)?,
      kind:       row.get(5)?,
      status:     row.get(6)?,
      gateway:    row.get(7)?,
      created_at: row.get(8)?,
    })
  }

  pub fn into_transaction(self) -> Result<Transaction> {
    Ok(Transaction {
      id:         self.id,
      user_id:    self.user_id,
      reference:  Uuid::parse_str(&self.reference)?,
      amount:     self.amount,
      currency:   self.currency,
      kind:       decode_code::<TransactionKind>("transaction kind", &self.kind)?,
      status:     decode_code::<TransactionStatus>("transaction status", &self.status)?,
      gateway:    self.gateway,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawAccess {
  pub id:         i64,
  pub user_id:    i64,
  pub tip_id:     i64,
  pub source:     String,
  pub granted_at: String,
}

impl RawAccess {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      tip_id:     row.get(2)?,
      source:     row.get(3)?,
      granted_at: row.get(4)?,
    })
  }

  pub fn into_access(self) -> Result<TipAccess> {
    Ok(TipAccess {
      id:         self.id,
      user_id:    self.user_id,
      tip_id:     self.tip_id,
      source:     decode_code::<AccessSource>("access source", &self.source)?,
      granted_at: decode_dt(&self.granted_at)?,
    })
  }
}
