//! Handlers for users, subscriptions and tip access.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/{user}/packages` | 404 if the user does not exist |
//! | `GET`  | `/users/{user}/tips/{tip_id}/access` | Access decision |
//! | `POST` | `/admin/users` | Body: [`NewUser`]; returns 201 |
//! | `POST` | `/admin/subscriptions` | Body: [`NewSubscription`]; returns 201 |
//! | `POST` | `/admin/access` | Body: `{"user_id":1,"tip_id":2,"source":"promo"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tipster_core::{
  access::{AccessDecision, AccessSource, TipAccess},
  store::TipStore,
  subscription::{NewSubscription, NewUser, UserPackage},
};

use crate::error::ApiError;

/// `GET /users/{email}/packages`
pub async fn packages<S>(
  State(store): State<Arc<S>>,
  Path(email): Path<String>,
) -> Result<Json<Vec<UserPackage>>, ApiError>
where
  S: TipStore,
{
  let packages = store
    .user_packages(email.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {email} not found")))?;
  Ok(Json(packages))
}

/// `GET /users/{user_id}/tips/{tip_id}/access`
pub async fn check_access<S>(
  State(store): State<Arc<S>>,
  Path((user_id, tip_id)): Path<(i64, i64)>,
) -> Result<Json<AccessDecision>, ApiError>
where
  S: TipStore,
{
  let decision = store
    .check_access(user_id, tip_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(decision))
}

/// `POST /admin/users`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TipStore,
{
  if !body.email.contains('@') {
    return Err(ApiError::BadRequest(format!("invalid email {:?}", body.email)));
  }
  let user = store.add_user(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /admin/subscriptions`
pub async fn subscribe<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSubscription>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TipStore,
{
  let receipt = store.subscribe(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(receipt)))
}

#[derive(Debug, Deserialize)]
pub struct GrantBody {
  pub user_id: i64,
  pub tip_id:  i64,
  pub source:  AccessSource,
}

/// `POST /admin/access`
pub async fn grant<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<GrantBody>,
) -> Result<Json<TipAccess>, ApiError>
where
  S: TipStore,
{
  let access = store
    .grant_access(body.user_id, body.tip_id, body.source)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(access))
}
