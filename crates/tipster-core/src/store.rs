//! The `TipStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tipster-store-sqlite`).
//! Higher layers (`tipster-api`, `tipster-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  StoreError,
  access::{AccessDecision, AccessSource, NewPurchase, PurchaseReceipt, TipAccess},
  display::TipDisplay,
  ingest::IngestReport,
  payload::IngestPayload,
  plan::{AssignRequest, NewPlan, PlanAssignment, PlanRule, SubscriptionPlan},
  subscription::{NewSubscription, NewUser, SubscriptionReceipt, User, UserPackage},
  taxonomy::Sport,
  tip::{Tip, TipResult},
};

/// Abstraction over a Tipster storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TipStore: Send + Sync {
  type Error: StoreError;

  // ── Taxonomy ──────────────────────────────────────────────────────────

  /// Find or create a sport by name.
  fn ensure_sport(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Sport, Self::Error>> + Send + '_;

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Run a decoded payload through taxonomy resolution, match and tip
  /// upserts and plan assignment as one atomic unit.
  ///
  /// Fails if the [`BASE_SPORT`](crate::BASE_SPORT) row has not been seeded.
  fn ingest(
    &self,
    payload: IngestPayload,
  ) -> impl Future<Output = Result<IngestReport, Self::Error>> + Send + '_;

  /// Replay the assignment engine for existing tips.
  fn assign_tips(
    &self,
    request: AssignRequest,
  ) -> impl Future<Output = Result<Vec<PlanAssignment>, Self::Error>> + Send + '_;

  /// The current assignment rule table.
  fn plan_rules(&self) -> impl Future<Output = Result<Vec<PlanRule>, Self::Error>> + Send + '_;

  // ── Plans ─────────────────────────────────────────────────────────────

  fn create_plan(
    &self,
    input: NewPlan,
  ) -> impl Future<Output = Result<SubscriptionPlan, Self::Error>> + Send + '_;

  fn list_plans(
    &self,
  ) -> impl Future<Output = Result<Vec<SubscriptionPlan>, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn get_plan(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<SubscriptionPlan>, Self::Error>> + Send + '_;

  /// Admin edit: overwrite a plan's `tips_list`. Every ID must exist.
  fn replace_plan_tips(
    &self,
    plan_id: i64,
    tip_ids: Vec<i64>,
  ) -> impl Future<Output = Result<SubscriptionPlan, Self::Error>> + Send + '_;

  // ── Tips ──────────────────────────────────────────────────────────────

  fn get_tip(&self, id: i64)
  -> impl Future<Output = Result<Option<Tip>, Self::Error>> + Send + '_;

  /// Expand tip IDs into display records, in input order. Unknown IDs are
  /// dropped.
  fn resolve_tips(
    &self,
    ids: Vec<i64>,
  ) -> impl Future<Output = Result<Vec<TipDisplay>, Self::Error>> + Send + '_;

  /// Flag a tip as the free tip for `date` and make it public.
  fn mark_free(
    &self,
    tip_id: i64,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Tip, Self::Error>> + Send + '_;

  /// Free tips published for `date`, ordered by kickoff.
  fn free_tips(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<TipDisplay>, Self::Error>> + Send + '_;

  /// Record the outcome of a tip. `TipResult::Pending` is rejected.
  fn settle_tip(
    &self,
    tip_id: i64,
    result: TipResult,
  ) -> impl Future<Output = Result<Tip, Self::Error>> + Send + '_;

  // ── Users & subscriptions ─────────────────────────────────────────────

  fn add_user(&self, input: NewUser)
  -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Subscribe a user to a plan, recording a stub payment for the plan price.
  fn subscribe(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<SubscriptionReceipt, Self::Error>> + Send + '_;

  /// All packages for the user with `email`, active first. `None` if the user
  /// does not exist.
  fn user_packages(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Vec<UserPackage>>, Self::Error>> + Send + '_;

  // ── Entitlements ──────────────────────────────────────────────────────

  /// Buy a single tip through the stub gateway.
  fn purchase_tip(
    &self,
    input: NewPurchase,
  ) -> impl Future<Output = Result<PurchaseReceipt, Self::Error>> + Send + '_;

  /// Grant access to a tip. Re-granting keeps the original row.
  fn grant_access(
    &self,
    user_id: i64,
    tip_id: i64,
    source: AccessSource,
  ) -> impl Future<Output = Result<TipAccess, Self::Error>> + Send + '_;

  /// Whether the user may see the tip: free today, explicitly granted, or
  /// listed by a plan the user has an active subscription to.
  fn check_access(
    &self,
    user_id: i64,
    tip_id: i64,
  ) -> impl Future<Output = Result<AccessDecision, Self::Error>> + Send + '_;
}
