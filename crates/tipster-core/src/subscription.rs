//! Users, subscriptions and the per-user package view.

use std::cmp::{Ordering, Reverse};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{access::Transaction, display::TipDisplay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  pub email:      String,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub email: String,
  pub name:  String,
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
pub enum SubscriptionStatus {
  #[default]
  Active,
  Pending,
  Canceled,
  Expired,
}

impl SubscriptionStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub id:         i64,
  pub user_id:    i64,
  pub plan_id:    i64,
  pub status:     SubscriptionStatus,
  pub start_at:   DateTime<Utc>,
  /// `None` never expires.
  pub end_at:     Option<DateTime<Utc>>,
  pub renews_at:  Option<DateTime<Utc>>,
  pub auto_renew: bool,
}

impl Subscription {
  /// Active iff the status is `active` and the end is unset or after `now`.
  pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
    self.status == SubscriptionStatus::Active && self.end_at.is_none_or(|end| end > now)
  }
}

/// Input to [`crate::store::TipStore::subscribe`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
  pub user_id:    i64,
  pub plan_id:    i64,
  #[serde(default)]
  pub auto_renew: bool,
}

/// A new subscription and the stub payment recorded for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionReceipt {
  pub subscription: Subscription,
  pub transaction:  Transaction,
}

/// One subscription as shown in a user's package list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPackage {
  pub subscription: Subscription,
  pub plan_name:    String,
  pub is_active:    bool,
  pub tips:         Vec<TipDisplay>,
}

/// Sort key: active first, then furthest expiry (open-ended counts as the
/// furthest), then newest subscription.
fn package_order(a: &Subscription, b: &Subscription, now: DateTime<Utc>) -> Ordering {
  let key = |s: &Subscription| {
    (
      Reverse(s.is_active_at(now)),
      Reverse(s.end_at.unwrap_or(DateTime::<Utc>::MAX_UTC)),
      Reverse(s.id),
    )
  };
  key(a).cmp(&key(b))
}

/// Order packages for display as of `now`.
pub fn order_packages(packages: &mut [UserPackage], now: DateTime<Utc>) {
  packages.sort_by(|a, b| package_order(&a.subscription, &b.subscription, now));
}

#[cfg(test)]
mod tests {
  use chrono::{TimeDelta, TimeZone as _};

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() }

  fn sub(id: i64, status: SubscriptionStatus, end_in_days: Option<i64>) -> Subscription {
    Subscription {
      id,
      user_id: 1,
      plan_id: 1,
      status,
      start_at: now() - TimeDelta::days(30),
      end_at: end_in_days.map(|d| now() + TimeDelta::days(d)),
      renews_at: None,
      auto_renew: false,
    }
  }

  fn package(s: Subscription) -> UserPackage {
    UserPackage { is_active: s.is_active_at(now()), subscription: s, plan_name: "P".into(), tips: vec![] }
  }

  #[test]
  fn active_predicate() {
    use SubscriptionStatus::*;
    assert!(sub(1, Active, None).is_active_at(now()));
    assert!(sub(1, Active, Some(1)).is_active_at(now()));
    assert!(!sub(1, Active, Some(0)).is_active_at(now()));
    assert!(!sub(1, Active, Some(-3)).is_active_at(now()));
    assert!(!sub(1, Canceled, Some(10)).is_active_at(now()));
  }

  #[test]
  fn active_first_then_furthest_expiry() {
    use SubscriptionStatus::*;
    let mut packages = vec![
      package(sub(1, Expired, Some(90))),
      package(sub(2, Active, Some(5))),
      package(sub(3, Active, Some(-1))),
      package(sub(4, Active, Some(30))),
      package(sub(5, Active, None)),
    ];
    order_packages(&mut packages, now());
    let ids: Vec<_> = packages.iter().map(|p| p.subscription.id).collect();
    assert_eq!(ids, [5, 4, 2, 1, 3]);
  }
}
