//! Entitlements: payments, single-tip purchases and tip access grants.
//!
//! Payments go through a stub gateway that completes immediately; only the
//! bookkeeping rows are real.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gateway name recorded on every transaction.
pub const STUB_GATEWAY: &str = "stub";

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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionKind {
  Subscription,
  TipPurchase,
}

impl TransactionKind {
  pub fn as_str(self) -> &'static str { self.into() }
}

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
pub enum TransactionStatus {
  Pending,
  Completed,
  Failed,
}

impl TransactionStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub id:         i64,
  pub user_id:    i64,
  /// Externally visible payment reference.
  pub reference:  Uuid,
  pub amount:     f64,
  pub currency:   String,
  pub kind:       TransactionKind,
  pub status:     TransactionStatus,
  pub gateway:    String,
  pub created_at: DateTime<Utc>,
}

/// How a user came to see a tip.
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
pub enum AccessSource {
  Subscription,
  Purchase,
  Promo,
  Free,
}

impl AccessSource {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// Unique per `(user_id, tip_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipAccess {
  pub id:         i64,
  pub user_id:    i64,
  pub tip_id:     i64,
  pub source:     AccessSource,
  pub granted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipPurchase {
  pub id:             i64,
  pub user_id:        i64,
  pub tip_id:         i64,
  pub transaction_id: i64,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`crate::store::TipStore::purchase_tip`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPurchase {
  pub user_id:  i64,
  pub tip_id:   i64,
  pub amount:   f64,
  #[serde(default = "default_currency")]
  pub currency: String,
}

fn default_currency() -> String { "KES".to_owned() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReceipt {
  pub purchase:    TipPurchase,
  pub transaction: Transaction,
  pub access:      TipAccess,
}

/// Answer to "may this user see this tip?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
  pub allowed: bool,
  /// Why access was granted; `None` when denied.
  pub source:  Option<AccessSource>,
}

impl AccessDecision {
  pub fn granted(source: AccessSource) -> Self { Self { allowed: true, source: Some(source) } }

  pub fn denied() -> Self { Self { allowed: false, source: None } }
}
