//! JSON REST API for Tipster.
//!
//! Exposes axum [`Router`]s backed by any [`tipster_core::store::TipStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility: the
//! admin router must be mounted behind an authentication layer.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tipster_api::public_router(store.clone()).merge(admin))
//! ```

pub mod error;
pub mod ingest;
pub mod plans;
pub mod tips;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use tipster_core::store::TipStore;

pub use error::ApiError;

/// Read-only routes open to any caller.
pub fn public_router<S>(store: Arc<S>) -> Router<()>
where
  S: TipStore + 'static,
{
  Router::new()
    // Plans
    .route("/plans", get(plans::list::<S>))
    .route("/plans/{id}", get(plans::get_one::<S>))
    .route("/plans/{id}/tips", get(plans::tips::<S>))
    // Tips
    .route("/tips/free", get(tips::free::<S>))
    // Users
    .route("/users/{user}/packages", get(users::packages::<S>))
    .route("/users/{user}/tips/{tip_id}/access", get(users::check_access::<S>))
    .with_state(store)
}

/// Write routes under `/admin`.
pub fn admin_router<S>(store: Arc<S>) -> Router<()>
where
  S: TipStore + 'static,
{
  Router::new()
    .route("/admin/ingest", post(ingest::ingest::<S>))
    // Plans
    .route("/admin/plans", post(plans::create::<S>))
    .route("/admin/plans/assign", post(ingest::assign::<S>))
    .route("/admin/plans/rules", get(plans::rules::<S>))
    .route("/admin/plans/{id}/tips", put(plans::replace_tips::<S>))
    // Users
    .route("/admin/users", post(users::create::<S>))
    .route("/admin/subscriptions", post(users::subscribe::<S>))
    .route("/admin/access", post(users::grant::<S>))
    // Tips
    .route("/admin/tips/{id}/free", post(tips::mark_free::<S>))
    .route("/admin/tips/{id}/settle", post(tips::settle::<S>))
    .route("/admin/tips/{id}/purchase", post(tips::purchase::<S>))
    .with_state(store)
}
