//! In-process cache of the `plan_rules` table.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use tipster_core::plan::PlanRule;
use tokio::sync::RwLock;

/// Rules are re-read from the database once the cached copy is older than
/// `ttl`. Admin edits to the table are visible after at most one TTL.
pub struct RuleCache {
  ttl:  Duration,
  slot: RwLock<Option<(Instant, Arc<[PlanRule]>)>>,
}

impl RuleCache {
  pub fn new(ttl: Duration) -> Self { Self { ttl, slot: RwLock::new(None) } }

  /// The cached rules, if loaded within the TTL.
  pub async fn fresh(&self) -> Option<Arc<[PlanRule]>> {
    let slot = self.slot.read().await;
    slot
      .as_ref()
      .filter(|(loaded, _)| loaded.elapsed() < self.ttl)
      .map(|(_, rules)| Arc::clone(rules))
  }

  pub async fn store(&self, rules: Vec<PlanRule>) -> Arc<[PlanRule]> {
    let rules: Arc<[PlanRule]> = rules.into();
    *self.slot.write().await = Some((Instant::now(), Arc::clone(&rules)));
    rules
  }

  pub async fn invalidate(&self) { *self.slot.write().await = None; }
}
