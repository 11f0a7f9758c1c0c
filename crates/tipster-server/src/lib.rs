//! HTTP server for Tipster.
//!
//! Mounts the [`tipster_api`] routers under `/api`, guards the admin routes
//! with HTTP Basic auth, and seeds the reference data ingestion depends on.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware};
use serde::Deserialize;
use tipster_core::{BASE_SPORT, store::TipStore};
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, Authenticated};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TIPSTER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  pub admin_username:      String,
  pub admin_password_hash: String,
  /// Sports created at startup if missing.
  #[serde(default = "default_seed_sports")]
  pub seed_sports:         Vec<String>,
  #[serde(default = "default_rule_cache_ttl_secs")]
  pub rule_cache_ttl_secs: u64,
  /// How long SQLite waits on a locked database before reporting busy.
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms:     u64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/tipster/tipster.db") }

fn default_seed_sports() -> Vec<String> { vec![BASE_SPORT.to_owned()] }

fn default_rule_cache_ttl_secs() -> u64 { 60 * 60 }

fn default_busy_timeout_ms() -> u64 { 5_000 }

impl ServerConfig {
  pub fn rule_cache_ttl(&self) -> Duration { Duration::from_secs(self.rule_cache_ttl_secs) }

  pub fn busy_timeout(&self) -> Duration { Duration::from_millis(self.busy_timeout_ms) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the auth layer.
#[derive(Clone)]
pub struct AppState<S: TipStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TipStore + Clone + 'static,
{
  let admin = tipster_api::admin_router(state.store.clone()).route_layer(
    middleware::from_extractor_with_state::<Authenticated, _>(state.clone()),
  );
  let api = tipster_api::public_router(state.store.clone()).merge(admin);

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

/// Create every sport in `sports` that does not exist yet.
pub async fn seed<S: TipStore>(store: &S, sports: &[String]) -> Result<(), Error> {
  for name in sports {
    let sport = store
      .ensure_sport(name.clone())
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    tracing::info!(sport = %sport.name, id = sport.id, "sport ready");
  }
  Ok(())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use serde_json::{Value, json};
  use tipster_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  const EPL: &str = r#"{"max": [{"league":"EPL","Home Team":"A","Away Team":"B",
    "date":"2025-01-01","tips":{"1_X_2":{"odds":1.9,"result":1}}}]}"#;

  async fn make_state(seeded: bool) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    if seeded {
      seed(&store, &default_seed_sports()).await.unwrap();
    }
    let hash = auth::hash_password("secret").unwrap();

    AppState {
      store: Arc::new(store),
      auth:  Arc::new(AuthConfig::new("admin", hash).unwrap()),
    }
  }

  fn admin_auth() -> String { format!("Basic {}", B64.encode("admin:secret")) }

  async fn call(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    auth:   bool,
    body:   &str,
  ) -> Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    if auth {
      builder = builder.header(header::AUTHORIZATION, admin_auth());
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Config ───────────────────────────────────────────────────────────────────

  #[test]
  fn config_fills_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("admin_username", "admin")
      .unwrap()
      .set_override("admin_password_hash", "hash")
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.seed_sports, ["Football"]);
    assert_eq!(cfg.rule_cache_ttl(), Duration::from_secs(3600));
    assert_eq!(cfg.busy_timeout(), Duration::from_millis(5_000));
  }

  // ── Auth ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_routes_require_credentials() {
    let state = make_state(true).await;
    let resp = call(&state, "POST", "/api/admin/ingest", false, EPL).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn public_routes_are_open() {
    let state = make_state(true).await;
    let resp = call(&state, "GET", "/api/plans", false, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([]));
  }

  // ── Ingest ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ingest_reports_counts() {
    let state = make_state(true).await;
    let resp = call(&state, "POST", "/api/admin/ingest", true, EPL).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["processed"], 1);
    assert_eq!(body["new_matches"], 1);
    assert_eq!(body["new_tips"], 1);
    assert_eq!(body["skipped"], json!([]));
    assert!(body["message"].is_string());
  }

  #[tokio::test]
  async fn malformed_payload_is_unprocessable() {
    let state = make_state(true).await;
    for body in ["{not json", "[1, 2]", "\"max\""] {
      let resp = call(&state, "POST", "/api/admin/ingest", true, body).await;
      assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "body {body}");
      assert!(json_body(resp).await["error"].is_string());
    }
  }

  #[tokio::test]
  async fn ingest_without_base_sport_fails() {
    let state = make_state(false).await;
    let resp = call(&state, "POST", "/api/admin/ingest", true, EPL).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  // ── Plans & packages ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn plan_tips_follow_ingestion() {
    let state = make_state(true).await;
    let plan = r#"{"name":"Daily 1X2","price":100.0}"#;
    let resp = call(&state, "POST", "/api/admin/plans", true, plan).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let plan_id = json_body(resp).await["id"].as_i64().unwrap();

    let resp = call(&state, "POST", "/api/admin/plans", true, plan).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body = json_body(call(&state, "POST", "/api/admin/ingest", true, EPL).await).await;
    assert_eq!(body["assignments"][0]["added_tips"], 1);

    let resp = call(&state, "GET", &format!("/api/plans/{plan_id}/tips"), false, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let tips = json_body(resp).await;
    assert_eq!(tips[0]["match"], "A vs B");
    assert_eq!(tips[0]["prediction"], "1");
    assert_eq!(tips[0]["tipType"], "1_X_2");
    assert_eq!(tips[0]["riskLevel"], "high");
    assert_eq!(tips[0]["winningStatus"], Value::Null);

    let resp = call(&state, "GET", "/api/plans/99/tips", false, "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn rule_table_is_listed_for_admins() {
    let state = make_state(true).await;
    let resp = call(&state, "GET", "/api/admin/plans/rules", false, "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = call(&state, "GET", "/api/admin/plans/rules", true, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rules = json_body(resp).await;
    assert_eq!(rules.as_array().unwrap().len(), 8);
    assert_eq!(rules[0]["plan_name"], "Daily 1X2");
    assert_eq!(rules[0]["tip_type"], "1_X_2");
    assert_eq!(rules[4]["confidence"], "max");
  }

  #[tokio::test]
  async fn packages_by_email() {
    let state = make_state(true).await;
    call(&state, "POST", "/api/admin/plans", true, r#"{"name":"Daily 1X2","price":100.0}"#).await;
    call(&state, "POST", "/api/admin/ingest", true, EPL).await;

    let resp = call(
      &state,
      "POST",
      "/api/admin/users",
      true,
      r#"{"email":"a@example.com","name":"Ann"}"#,
    )
    .await;
    let user_id = json_body(resp).await["id"].as_i64().unwrap();

    let sub = json!({ "user_id": user_id, "plan_id": 1 }).to_string();
    let resp = call(&state, "POST", "/api/admin/subscriptions", true, &sub).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call(&state, "GET", "/api/users/a@example.com/packages", false, "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let packages = json_body(resp).await;
    assert_eq!(packages[0]["plan_name"], "Daily 1X2");
    assert_eq!(packages[0]["is_active"], true);
    assert_eq!(packages[0]["tips"][0]["homeTeam"], "A");

    let uri = format!("/api/users/{user_id}/tips/1/access");
    let decision = json_body(call(&state, "GET", &uri, false, "").await).await;
    assert_eq!(decision, json!({ "allowed": true, "source": "subscription" }));

    let resp = call(&state, "GET", "/api/users/nobody@example.com/packages", false, "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn free_tip_round_trip() {
    let state = make_state(true).await;
    call(&state, "POST", "/api/admin/ingest", true, EPL).await;

    let resp = call(&state, "POST", "/api/admin/tips/1/free", true, r#"{"date":"2025-01-01"}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let free = json_body(call(&state, "GET", "/api/tips/free?date=2025-01-01", false, "").await).await;
    assert_eq!(free.as_array().unwrap().len(), 1);

    let resp = call(&state, "POST", "/api/admin/tips/1/settle", true, r#"{"result":"pending"}"#).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
