//! Handlers for `/plans` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/plans` | All plans |
//! | `GET`  | `/plans/{id}` | 404 if not found |
//! | `GET`  | `/plans/{id}/tips` | The plan's tips as display records, list order |
//! | `POST` | `/admin/plans` | Body: [`NewPlan`]; returns 201 |
//! | `GET`  | `/admin/plans/rules` | The assignment rule table |
//! | `PUT`  | `/admin/plans/{id}/tips` | Body: `{"tip_ids":[..]}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tipster_core::{
  display::TipDisplay,
  plan::{NewPlan, PlanRule, SubscriptionPlan},
  store::TipStore,
};

use crate::error::ApiError;

/// `GET /plans`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<SubscriptionPlan>>, ApiError>
where
  S: TipStore,
{
  let plans = store.list_plans().await.map_err(ApiError::store)?;
  Ok(Json(plans))
}

/// `GET /admin/plans/rules`
pub async fn rules<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<PlanRule>>, ApiError>
where
  S: TipStore,
{
  Ok(Json(store.plan_rules().await.map_err(ApiError::store)?))
}

async fn find<S: TipStore>(store: &S, id: i64) -> Result<SubscriptionPlan, ApiError> {
  store
    .get_plan(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("plan {id} not found")))
}

/// `GET /plans/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<SubscriptionPlan>, ApiError>
where
  S: TipStore,
{
  Ok(Json(find(store.as_ref(), id).await?))
}

/// `GET /plans/{id}/tips`
pub async fn tips<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<TipDisplay>>, ApiError>
where
  S: TipStore,
{
  let plan = find(store.as_ref(), id).await?;
  let tips = store
    .resolve_tips(plan.features.tips_list)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(tips))
}

/// `POST /admin/plans`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPlan>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TipStore,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("plan name must not be empty".into()));
  }
  let plan = store.create_plan(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(plan)))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceTipsBody {
  pub tip_ids: Vec<i64>,
}

/// `PUT /admin/plans/{id}/tips`
pub async fn replace_tips<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<ReplaceTipsBody>,
) -> Result<Json<SubscriptionPlan>, ApiError>
where
  S: TipStore,
{
  let plan = store
    .replace_plan_tips(id, body.tip_ids)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(plan))
}
