//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/{id}` | Profile; 404 if not found |
//! | `PUT`  | `/users/{id}/push-token` | Body: `{"token":"..."}` |
//! | `GET`  | `/users/{id}/notifications` | Newest first; `?unread=true` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
};
use fuelflow_core::{
  lifecycle::LifecycleController,
  notification::Notification,
  push::PushTransport,
  store::FuelStore,
  user::{User, UserId},
};
use serde::Deserialize;

use crate::{
  envelope::{self, Reply},
  error::ApiError,
};

async fn require_user<S, P>(
  ctl: &LifecycleController<S, P>,
  id: UserId,
) -> Result<User, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  ctl
    .store()
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))
}

/// `GET /users/{id}`
pub async fn get_one<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Reply<User>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let user = require_user(&ctl, UserId(id?.0)).await?;
  Ok(envelope::ok("User", user))
}

// ─── Push token ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PushTokenBody {
  pub token: String,
}

/// `PUT /users/{id}/push-token`
pub async fn set_push_token<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  id: Result<Path<i64>, PathRejection>,
  body: Result<Json<PushTokenBody>, JsonRejection>,
) -> Result<Reply<()>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let id = UserId(id?.0);
  let Json(body) = body?;
  let token = body.token.trim();
  if token.is_empty() {
    return Err(ApiError::BadRequest("token must not be empty".into()));
  }

  let updated = ctl
    .store()
    .set_push_token(id, token.to_owned())
    .await
    .map_err(ApiError::store)?;
  if !updated {
    return Err(ApiError::NotFound(format!("user {id} not found")));
  }
  Ok(envelope::done("Push token saved"))
}

// ─── Inbox ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct InboxParams {
  #[serde(default)]
  pub unread: bool,
}

/// `GET /users/{id}/notifications[?unread=true]`
pub async fn notifications<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  id: Result<Path<i64>, PathRejection>,
  params: Result<Query<InboxParams>, QueryRejection>,
) -> Result<Reply<Vec<Notification>>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let id = UserId(id?.0);
  let Query(params) = params?;
  require_user(&ctl, id).await?;

  let inbox = ctl
    .store()
    .list_for_user(id, params.unread)
    .await
    .map_err(ApiError::store)?;
  Ok(envelope::ok(format!("{} notifications", inbox.len()), inbox))
}
