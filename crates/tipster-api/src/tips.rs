//! Handlers for tip endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tips/free` | Optional `?date=YYYY-MM-DD`, default today (UTC) |
//! | `POST` | `/admin/tips/{id}/free` | Body: `{"date":"YYYY-MM-DD"}`, date optional |
//! | `POST` | `/admin/tips/{id}/settle` | Body: `{"result":"won"}` |
//! | `POST` | `/admin/tips/{id}/purchase` | Body: `{"user_id":1,"amount":50.0}`; returns 201 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tipster_core::{
  access::NewPurchase,
  display::TipDisplay,
  store::TipStore,
  tip::{Tip, TipResult},
};

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
  pub date: Option<NaiveDate>,
}

fn today() -> NaiveDate { Utc::now().date_naive() }

/// `GET /tips/free[?date=YYYY-MM-DD]`
pub async fn free<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<DateParams>,
) -> Result<Json<Vec<TipDisplay>>, ApiError>
where
  S: TipStore,
{
  let date = params.date.unwrap_or_else(today);
  let tips = store.free_tips(date).await.map_err(ApiError::store)?;
  Ok(Json(tips))
}

/// `POST /admin/tips/{id}/free`
pub async fn mark_free<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  body: Option<Json<DateParams>>,
) -> Result<Json<Tip>, ApiError>
where
  S: TipStore,
{
  let date = body.and_then(|Json(b)| b.date).unwrap_or_else(today);
  let tip = store.mark_free(id, date).await.map_err(ApiError::store)?;
  Ok(Json(tip))
}

#[derive(Debug, Deserialize)]
pub struct SettleBody {
  pub result: TipResult,
}

/// `POST /admin/tips/{id}/settle`
pub async fn settle<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<SettleBody>,
) -> Result<Json<Tip>, ApiError>
where
  S: TipStore,
{
  let tip = store.settle_tip(id, body.result).await.map_err(ApiError::store)?;
  Ok(Json(tip))
}

#[derive(Debug, Deserialize)]
pub struct PurchaseBody {
  pub user_id:  i64,
  pub amount:   f64,
  pub currency: Option<String>,
}

/// `POST /admin/tips/{id}/purchase`
pub async fn purchase<S>(
  State(store): State<Arc<S>>,
  Path(tip_id): Path<i64>,
  Json(body): Json<PurchaseBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TipStore,
{
  if !(body.amount.is_finite() && body.amount >= 0.0) {
    return Err(ApiError::BadRequest(format!("invalid amount {}", body.amount)));
  }
  let input = NewPurchase {
    user_id: body.user_id,
    tip_id,
    amount: body.amount,
    currency: body.currency.unwrap_or_else(|| "KES".to_owned()),
  };
  let receipt = store.purchase_tip(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(receipt)))
}
