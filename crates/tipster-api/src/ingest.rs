//! Handlers for ingestion and assignment replay.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/ingest` | Body: the bucketed match payload; 422 if not a JSON object |
//! | `POST` | `/admin/plans/assign` | Body: [`AssignRequest`]; returns touched plans with their tips |

use std::sync::Arc;

use axum::{Json, extract::State};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tipster_core::{
  display::TipDisplay,
  ingest::IngestReport,
  payload::IngestPayload,
  plan::{AssignRequest, PlanAssignment},
  store::TipStore,
};

use crate::error::ApiError;

// ─── Ingest ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct IngestResponse {
  pub message: String,
  #[serde(flatten)]
  pub report:  IngestReport,
}

/// `POST /admin/ingest`
///
/// The body is read raw so malformed JSON maps to 422 with the parser's
/// message rather than axum's default rejection.
pub async fn ingest<S>(
  State(store): State<Arc<S>>,
  body: Bytes,
) -> Result<Json<IngestResponse>, ApiError>
where
  S: TipStore,
{
  let payload = IngestPayload::from_slice(&body, Utc::now())
    .map_err(|e| ApiError::Unprocessable(e.to_string()))?;
  if !payload.ignored_buckets.is_empty() {
    tracing::debug!(buckets = ?payload.ignored_buckets, "ignored non-array buckets");
  }

  let report = store.ingest(payload).await.map_err(ApiError::store)?;
  let message = format!(
    "processed {} matches: {} new matches, {} new tips, {} skipped",
    report.processed,
    report.new_matches,
    report.new_tips,
    report.skipped.len(),
  );
  Ok(Json(IngestResponse { message, report }))
}

// ─── Assign ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AssignedPlan {
  #[serde(flatten)]
  pub assignment: PlanAssignment,
  pub tips:       Vec<TipDisplay>,
}

/// `POST /admin/plans/assign`
pub async fn assign<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<AssignRequest>,
) -> Result<Json<Vec<AssignedPlan>>, ApiError>
where
  S: TipStore,
{
  let assignments = store.assign_tips(body).await.map_err(ApiError::store)?;

  let mut out = Vec::with_capacity(assignments.len());
  for assignment in assignments {
    let tips = match store.get_plan(assignment.plan_id).await.map_err(ApiError::store)? {
      Some(plan) => store
        .resolve_tips(plan.features.tips_list)
        .await
        .map_err(ApiError::store)?,
      None => Vec::new(),
    };
    out.push(AssignedPlan { assignment, tips });
  }
  Ok(Json(out))
}
