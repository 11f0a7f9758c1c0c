//! [`SqliteStore`], the SQLite implementation of [`TipStore`].

use std::{collections::BTreeSet, path::Path, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDate, SubsecRound as _, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tipster_core::{
  access::{
    AccessDecision, AccessSource, NewPurchase, PurchaseReceipt, STUB_GATEWAY, TipAccess,
    TipPurchase, Transaction, TransactionKind, TransactionStatus,
  },
  display::{TipDetail, TipDisplay, resolve_in_order},
  ingest::IngestReport,
  payload::IngestPayload,
  plan::{
    AssignRequest, NewPlan, PlanAssignment, PlanFeatures, PlanRule, SubscriptionPlan,
    default_rules,
  },
  store::TipStore,
  subscription::{
    NewSubscription, NewUser, Subscription, SubscriptionReceipt, SubscriptionStatus, User,
    UserPackage, order_packages,
  },
  taxonomy::{Sport, slugify},
  tip::{Tip, TipResult, TipStatus, Visibility},
};

use crate::{
  Error, Result,
  encode::{
    PLAN_COLUMNS, RawAccess, RawPlan, RawRule, RawSubscription, RawTip, RawTipDetail,
    RawTransaction, RawUser, SUBSCRIPTION_COLUMNS, TRANSACTION_COLUMNS, decode_features,
    encode_date, encode_dt, encode_features, tip_columns,
  },
  ingest,
  rules::RuleCache,
  schema::{SCHEMA, SEED_RULE},
};

/// How long the plan rule table is cached before being re-read.
pub const DEFAULT_RULE_TTL: Duration = Duration::from_secs(60 * 60);

/// Attempts made for an ingestion run when SQLite reports lock contention.
pub(crate) const MAX_ATTEMPTS: u32 = 3;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on tip IDs bound into one `IN (...)` lookup.
const DETAIL_CHUNK: usize = 500;

/// Tip rows joined with the names they are displayed under.
const DETAIL_SELECT: &str = concat!(
  "SELECT ",
  tip_columns!(),
  ", h.name, a.name, l.name, m.kickoff_at
   FROM tips t
   JOIN matches m ON m.id = t.match_id
   JOIN teams   h ON h.id = m.home_team_id
   JOIN teams   a ON a.id = m.away_team_id
   JOIN leagues l ON l.id = m.league_id"
);

fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(0) }

/// Run `op` until it succeeds, fails with a non-transient error, or has been
/// tried [`MAX_ATTEMPTS`] times.
pub(crate) async fn retry_transient<T, F, Fut>(mut op: F) -> Result<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T>>,
{
  let mut attempt = 1;
  loop {
    match op().await {
      Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
        tracing::warn!(attempt, error = %e, "database busy, retrying");
        tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
        attempt += 1;
      }
      result => return result,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tipster store backed by a single SQLite file.
///
/// Cloning is cheap; the connection and the rule cache are shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  rules: Arc<RuleCache>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn, rules: Arc::new(RuleCache::new(DEFAULT_RULE_TTL)) };
    store.init_schema().await?;
    Ok(store)
  }

  /// How long a statement waits on a locked database before reporting
  /// `SQLITE_BUSY`.
  pub async fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
    self
      .with_conn(move |conn| {
        conn.busy_timeout(timeout)?;
        Ok(())
      })
      .await
  }

  /// Replace the rule cache with one using `ttl`.
  pub fn with_rule_ttl(mut self, ttl: Duration) -> Self {
    self.rules = Arc::new(RuleCache::new(ttl));
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .with_conn(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        let mut seed = conn.prepare(SEED_RULE)?;
        for rule in default_rules() {
          seed.execute(rusqlite::params![
            rule.plan_name,
            rule.max_tips.and_then(|m| i64::try_from(m).ok()),
            rule.tip_type.as_str(),
            rule.jackpot_tag,
            rule.confidence,
          ])?;
        }
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread, carrying crate errors across the
  /// thread boundary intact.
  async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| f(conn).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e))))
      .await
      .map_err(Error::from_call)
  }

  /// The rule table, from cache when fresh.
  async fn rules(&self) -> Result<Arc<[PlanRule]>> {
    if let Some(rules) = self.rules.fresh().await {
      return Ok(rules);
    }
    let rules = self.with_conn(|conn| load_rules(conn)).await?;
    tracing::debug!(count = rules.len(), "loaded plan rules");
    Ok(self.rules.store(rules).await)
  }

  /// Drop the cached rule table so the next run re-reads it.
  pub async fn invalidate_rules(&self) { self.rules.invalidate().await; }
}

// ─── Row loaders ─────────────────────────────────────────────────────────────

fn load_rules(conn: &Connection) -> Result<Vec<PlanRule>> {
  let mut stmt = conn.prepare(
    "SELECT plan_name, max_tips, tip_type, jackpot_tag, confidence
     FROM plan_rules ORDER BY rowid",
  )?;
  let raws = stmt
    .query_map([], RawRule::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawRule::into_rule).collect()
}

fn load_plan(conn: &Connection, id: i64) -> Result<Option<SubscriptionPlan>> {
  conn
    .query_row(
      &format!("SELECT {PLAN_COLUMNS} FROM subscription_plans WHERE id = ?1"),
      [id],
      RawPlan::from_row,
    )
    .optional()?
    .map(RawPlan::into_plan)
    .transpose()
}

fn load_tip(conn: &Connection, id: i64) -> Result<Option<Tip>> {
  conn
    .query_row(
      concat!("SELECT ", tip_columns!(), " FROM tips t WHERE t.id = ?1"),
      [id],
      RawTip::from_row,
    )
    .optional()?
    .map(RawTip::into_tip)
    .transpose()
}

fn require_tip(conn: &Connection, id: i64) -> Result<Tip> {
  load_tip(conn, id)?.ok_or(Error::TipNotFound(id))
}

fn require_user(conn: &Connection, id: i64) -> Result<()> {
  let found: Option<i64> = conn
    .query_row("SELECT id FROM users WHERE id = ?1", [id], |r| r.get(0))
    .optional()?;
  found.map(|_| ()).ok_or(Error::UserNotFound(id))
}

/// Load the display rows for `ids`, ignoring IDs with no tip.
///
/// Duplicates are collapsed and the lookup is split into statements of at
/// most [`DETAIL_CHUNK`] bound IDs. The result is in no particular order.
fn load_details(conn: &Connection, ids: &[i64]) -> Result<Vec<TipDetail>> {
  let unique: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

  let mut details = Vec::with_capacity(unique.len());
  for chunk in unique.chunks(DETAIL_CHUNK) {
    let placeholders = vec!["?"; chunk.len()].join(", ");
    let mut stmt =
      conn.prepare_cached(&format!("{DETAIL_SELECT} WHERE t.id IN ({placeholders})"))?;
    let raws = stmt
      .query_map(rusqlite::params_from_iter(chunk), RawTipDetail::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    for raw in raws {
      details.push(raw.into_detail()?);
    }
  }
  Ok(details)
}

fn load_access(conn: &Connection, user_id: i64, tip_id: i64) -> Result<Option<TipAccess>> {
  conn
    .query_row(
      "SELECT id, user_id, tip_id, source, granted_at
       FROM tip_access WHERE user_id = ?1 AND tip_id = ?2",
      [user_id, tip_id],
      RawAccess::from_row,
    )
    .optional()?
    .map(RawAccess::into_access)
    .transpose()
}

/// Every subscription of `user_id` with its plan name and features.
fn load_subscriptions(
  conn: &Connection,
  user_id: i64,
) -> Result<Vec<(Subscription, String, PlanFeatures)>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {SUBSCRIPTION_COLUMNS}, p.name, p.features
     FROM subscriptions s
     JOIN subscription_plans p ON p.id = s.plan_id
     WHERE s.user_id = ?1"
  ))?;
  let raws = stmt
    .query_map([user_id], |row| {
      Ok((RawSubscription::from_row(row)?, row.get::<_, String>(8)?, row.get::<_, String>(9)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws
    .into_iter()
    .map(|(raw, name, features)| {
      Ok((raw.into_subscription()?, name, decode_features(&features)?))
    })
    .collect()
}

/// Insert a completed stub-gateway transaction.
fn record_transaction(
  conn: &Connection,
  user_id: i64,
  amount: f64,
  currency: &str,
  kind: TransactionKind,
  at: DateTime<Utc>,
) -> Result<Transaction> {
  let reference = Uuid::new_v4();
  conn.execute(
    "INSERT INTO transactions (
       user_id, reference, amount, currency, kind, status, gateway, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      user_id,
      reference.to_string(),
      amount,
      currency,
      kind.as_str(),
      TransactionStatus::Completed.as_str(),
      STUB_GATEWAY,
      encode_dt(at),
    ],
  )?;
  let id = conn.last_insert_rowid();
  conn
    .query_row(
      &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"),
      [id],
      RawTransaction::from_row,
    )?
    .into_transaction()
}

/// Insert an access row unless one exists, then return the stored row.
fn upsert_access(
  conn: &Connection,
  user_id: i64,
  tip_id: i64,
  source: AccessSource,
  at: DateTime<Utc>,
) -> Result<TipAccess> {
  conn.execute(
    "INSERT INTO tip_access (user_id, tip_id, source, granted_at) VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (user_id, tip_id) DO NOTHING",
    rusqlite::params![user_id, tip_id, source.as_str(), encode_dt(at)],
  )?;
  load_access(conn, user_id, tip_id)?
    .ok_or_else(|| Error::Decode(format!("access row for user {user_id} tip {tip_id} vanished")))
}

// ─── TipStore impl ───────────────────────────────────────────────────────────

impl TipStore for SqliteStore {
  type Error = Error;

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn ensure_sport(&self, name: String) -> Result<Sport> {
    self
      .with_conn(move |conn| {
        conn.execute("INSERT OR IGNORE INTO sports (name) VALUES (?1)", [&name])?;
        let id = conn.query_row("SELECT id FROM sports WHERE name = ?1", [&name], |r| r.get(0))?;
        Ok(Sport { id, name })
      })
      .await
  }

  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn ingest(&self, payload: IngestPayload) -> Result<IngestReport> {
    let rules = self.rules().await?;
    let payload = Arc::new(payload);

    let store = self;
    let report = retry_transient(move || {
      let (payload, rules) = (Arc::clone(&payload), Arc::clone(&rules));
      store.with_conn(move |conn| ingest::run(conn, &payload, &rules, now()))
    })
    .await?;

    tracing::info!(
      processed = report.processed,
      new_matches = report.new_matches,
      new_tips = report.new_tips,
      skipped = report.skipped.len(),
      "ingestion committed"
    );
    Ok(report)
  }

  async fn assign_tips(&self, request: AssignRequest) -> Result<Vec<PlanAssignment>> {
    let rules = self.rules().await?;
    self
      .with_conn(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = ingest::assign(
          &tx,
          &rules,
          &request.tip_ids,
          &request.confidence,
          request.jackpot.as_deref(),
        )?;
        tx.commit()?;
        Ok(out)
      })
      .await
  }

  async fn plan_rules(&self) -> Result<Vec<PlanRule>> { Ok(self.rules().await?.to_vec()) }

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn create_plan(&self, input: NewPlan) -> Result<SubscriptionPlan> {
    self
      .with_conn(move |conn| {
        let taken: Option<i64> = conn
          .query_row("SELECT id FROM subscription_plans WHERE name = ?1", [&input.name], |r| {
            r.get(0)
          })
          .optional()?;
        if taken.is_some() {
          return Err(Error::Duplicate(format!("plan {:?}", input.name)));
        }

        let mut features = input.features;
        let ids = std::mem::take(&mut features.tips_list);
        features.replace_tips(&ids);

        conn.execute(
          "INSERT INTO subscription_plans (
             name, slug, price, currency, billing_interval, interval_count, features, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            input.name,
            slugify(&input.name),
            input.price,
            input.currency,
            input.interval.as_str(),
            input.interval_count,
            encode_features(&features)?,
            encode_dt(now()),
          ],
        )?;
        let id = conn.last_insert_rowid();
        load_plan(conn, id)?.ok_or(Error::PlanNotFound(id))
      })
      .await
  }

  async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>> {
    self
      .with_conn(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PLAN_COLUMNS} FROM subscription_plans ORDER BY id"))?;
        let raws = stmt
          .query_map([], RawPlan::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPlan::into_plan).collect()
      })
      .await
  }

  async fn get_plan(&self, id: i64) -> Result<Option<SubscriptionPlan>> {
    self.with_conn(move |conn| load_plan(conn, id)).await
  }

  async fn replace_plan_tips(&self, plan_id: i64, tip_ids: Vec<i64>) -> Result<SubscriptionPlan> {
    self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        let mut plan = load_plan(&tx, plan_id)?.ok_or(Error::PlanNotFound(plan_id))?;
        for &id in &tip_ids {
          require_tip(&tx, id)?;
        }
        plan.features.replace_tips(&tip_ids);
        tx.execute(
          "UPDATE subscription_plans SET features = ?2 WHERE id = ?1",
          rusqlite::params![plan_id, encode_features(&plan.features)?],
        )?;
        tx.commit()?;
        Ok(plan)
      })
      .await
  }

  // ── Tips ──────────────────────────────────────────────────────────────────

  async fn get_tip(&self, id: i64) -> Result<Option<Tip>> {
    self.with_conn(move |conn| load_tip(conn, id)).await
  }

  async fn resolve_tips(&self, ids: Vec<i64>) -> Result<Vec<TipDisplay>> {
    self
      .with_conn(move |conn| {
        let details = load_details(conn, &ids)?;
        Ok(resolve_in_order(&ids, details))
      })
      .await
  }

  async fn mark_free(&self, tip_id: i64, date: NaiveDate) -> Result<Tip> {
    self
      .with_conn(move |conn| {
        let changed = conn.execute(
          "UPDATE tips SET is_free = 1, free_for_date = ?2, visibility = ?3 WHERE id = ?1",
          rusqlite::params![tip_id, encode_date(date), Visibility::Public.as_str()],
        )?;
        if changed == 0 {
          return Err(Error::TipNotFound(tip_id));
        }
        require_tip(conn, tip_id)
      })
      .await
  }

  async fn free_tips(&self, date: NaiveDate) -> Result<Vec<TipDisplay>> {
    self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{DETAIL_SELECT}
           WHERE t.is_free = 1 AND t.free_for_date = ?1
           ORDER BY m.kickoff_at, t.id"
        ))?;
        let raws = stmt
          .query_map([encode_date(date)], RawTipDetail::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws
          .into_iter()
          .map(|raw| Ok(TipDisplay::from_detail(&raw.into_detail()?)))
          .collect()
      })
      .await
  }

  async fn settle_tip(&self, tip_id: i64, result: TipResult) -> Result<Tip> {
    if !result.is_final() {
      return Err(Error::PendingSettlement);
    }
    let tip = self
      .with_conn(move |conn| {
        let changed = conn.execute(
          "UPDATE tips SET status = ?2, result = ?3, settled_at = ?4 WHERE id = ?1",
          rusqlite::params![
            tip_id,
            TipStatus::Settled.as_str(),
            result.as_str(),
            encode_dt(now())
          ],
        )?;
        if changed == 0 {
          return Err(Error::TipNotFound(tip_id));
        }
        require_tip(conn, tip_id)
      })
      .await?;
    tracing::info!(tip_id, result = result.as_str(), "tip settled");
    Ok(tip)
  }

  // ── Users & subscriptions ─────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    self
      .with_conn(move |conn| {
        let taken: Option<i64> = conn
          .query_row("SELECT id FROM users WHERE email = ?1", [&input.email], |r| r.get(0))
          .optional()?;
        if taken.is_some() {
          return Err(Error::Duplicate(format!("user {:?}", input.email)));
        }

        conn.execute(
          "INSERT INTO users (email, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![input.email, input.name, encode_dt(now())],
        )?;
        let id = conn.last_insert_rowid();
        conn
          .query_row(
            "SELECT id, email, name, created_at FROM users WHERE id = ?1",
            [id],
            RawUser::from_row,
          )?
          .into_user()
      })
      .await
  }

  async fn subscribe(&self, input: NewSubscription) -> Result<SubscriptionReceipt> {
    self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        require_user(&tx, input.user_id)?;
        let plan = load_plan(&tx, input.plan_id)?.ok_or(Error::PlanNotFound(input.plan_id))?;

        let start_at = now();
        let end_at = plan
          .interval
          .advance(start_at, plan.interval_count)
          .ok_or(Error::EndOutOfRange)?;
        let renews_at = input.auto_renew.then_some(end_at);
        let status = SubscriptionStatus::Active;

        tx.execute(
          "INSERT INTO subscriptions (
             user_id, plan_id, status, start_at, end_at, renews_at, auto_renew
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            input.user_id,
            plan.id,
            status.as_str(),
            encode_dt(start_at),
            encode_dt(end_at),
            renews_at.map(encode_dt),
            input.auto_renew,
          ],
        )?;
        let subscription = Subscription {
          id: tx.last_insert_rowid(),
          user_id: input.user_id,
          plan_id: plan.id,
          status,
          start_at,
          end_at: Some(end_at),
          renews_at,
          auto_renew: input.auto_renew,
        };

        let transaction = record_transaction(
          &tx,
          input.user_id,
          plan.price,
          &plan.currency,
          TransactionKind::Subscription,
          start_at,
        )?;
        tx.commit()?;

        tracing::info!(
          user_id = subscription.user_id,
          plan = %plan.name,
          reference = %transaction.reference,
          "subscription created"
        );
        Ok(SubscriptionReceipt { subscription, transaction })
      })
      .await
  }

  async fn user_packages(&self, email: String) -> Result<Option<Vec<UserPackage>>> {
    self
      .with_conn(move |conn| {
        let user_id: Option<i64> = conn
          .query_row("SELECT id FROM users WHERE email = ?1", [&email], |r| r.get(0))
          .optional()?;
        let Some(user_id) = user_id else { return Ok(None) };

        let subscriptions = load_subscriptions(conn, user_id)?;
        let all_ids: Vec<i64> = subscriptions
          .iter()
          .flat_map(|(_, _, features)| features.tips_list.iter().copied())
          .collect::<BTreeSet<_>>()
          .into_iter()
          .collect();
        let details = load_details(conn, &all_ids)?;

        let at = now();
        let mut packages: Vec<UserPackage> = subscriptions
          .into_iter()
          .map(|(subscription, plan_name, features)| UserPackage {
            is_active: subscription.is_active_at(at),
            tips: resolve_in_order(&features.tips_list, details.clone()),
            subscription,
            plan_name,
          })
          .collect();
        order_packages(&mut packages, at);
        Ok(Some(packages))
      })
      .await
  }

  // ── Entitlements ──────────────────────────────────────────────────────────

  async fn purchase_tip(&self, input: NewPurchase) -> Result<PurchaseReceipt> {
    self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        require_user(&tx, input.user_id)?;
        require_tip(&tx, input.tip_id)?;

        let at = now();
        let transaction = record_transaction(
          &tx,
          input.user_id,
          input.amount,
          &input.currency,
          TransactionKind::TipPurchase,
          at,
        )?;
        tx.execute(
          "INSERT INTO tip_purchases (user_id, tip_id, transaction_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.user_id, input.tip_id, transaction.id, encode_dt(at)],
        )?;
        let purchase = TipPurchase {
          id:             tx.last_insert_rowid(),
          user_id:        input.user_id,
          tip_id:         input.tip_id,
          transaction_id: transaction.id,
          created_at:     at,
        };
        let access = upsert_access(&tx, input.user_id, input.tip_id, AccessSource::Purchase, at)?;
        tx.commit()?;

        Ok(PurchaseReceipt { purchase, transaction, access })
      })
      .await
  }

  async fn grant_access(
    &self,
    user_id: i64,
    tip_id: i64,
    source: AccessSource,
  ) -> Result<TipAccess> {
    self
      .with_conn(move |conn| {
        require_user(conn, user_id)?;
        require_tip(conn, tip_id)?;
        upsert_access(conn, user_id, tip_id, source, now())
      })
      .await
  }

  async fn check_access(&self, user_id: i64, tip_id: i64) -> Result<AccessDecision> {
    self
      .with_conn(move |conn| {
        require_user(conn, user_id)?;
        let tip = require_tip(conn, tip_id)?;

        let at = now();
        if tip.visibility == Visibility::Public && tip.is_free_on(at.date_naive()) {
          return Ok(AccessDecision::granted(AccessSource::Free));
        }
        if let Some(access) = load_access(conn, user_id, tip_id)? {
          return Ok(AccessDecision::granted(access.source));
        }
        let subscribed = load_subscriptions(conn, user_id)?
          .iter()
          .any(|(sub, _, features)| sub.is_active_at(at) && features.tips_list.contains(&tip_id));
        if subscribed {
          return Ok(AccessDecision::granted(AccessSource::Subscription));
        }
        Ok(AccessDecision::denied())
      })
      .await
  }
}
