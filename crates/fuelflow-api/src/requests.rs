//! Handlers for `/requests` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/requests` | Submit; notifies every manager |
//! | `GET`  | `/requests` | `?driverId=<id>` and/or `?status=Pending,Approved` |
//! | `GET`  | `/requests/{id}` | 404 if not found |
//! | `POST` | `/requests/{id}/decision` | Body: `{"status":"Approved"}`; 409 if already decided |

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
  push::PushTransport,
  request::{Decision, FuelRequest, NewReceipt, PurchaseFacts, RequestId, Status},
  store::FuelStore,
  user::UserId,
};
use serde::{Deserialize, Serialize};

use crate::{
  envelope::{self, Reply},
  error::ApiError,
};

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
  pub user_id: UserId,
  #[serde(flatten)]
  pub facts:   PurchaseFacts,
  pub receipt: Option<NewReceipt>,
}

/// `POST /requests`
pub async fn submit<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Reply<FuelRequest>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let Json(body) = body?;
  let submission = ctl.submit(body.user_id, body.facts, body.receipt).await?;
  let message =
    envelope::mutation_message("Fuel request submitted", submission.fan_out.is_degraded());
  Ok(envelope::created(message, submission.request))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub driver_id: Option<UserId>,
  /// Comma-separated statuses.
  pub status:    Option<String>,
}

fn parse_statuses(raw: &str) -> Result<Vec<Status>, ApiError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      s.parse::<Status>()
        .map_err(|_| ApiError::BadRequest(format!("unknown status {s:?}")))
    })
    .collect()
}

/// `GET /requests[?driverId=<id>][&status=<s>,<s>]`
///
/// Without a status filter every status is listed.
pub async fn list<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Reply<Vec<FuelRequest>>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let Query(params) = params?;
  let statuses = match params.status.as_deref() {
    Some(raw) => parse_statuses(raw)?,
    None => vec![Status::Pending, Status::Approved, Status::Rejected],
  };

  let store = ctl.store();
  let requests = match params.driver_id {
    Some(driver) => store
      .list_by_owner(driver)
      .await
      .map_err(ApiError::store)?
      .into_iter()
      .filter(|r| statuses.contains(&r.status))
      .collect(),
    None => store.list_by_status(statuses).await.map_err(ApiError::store)?,
  };
  Ok(envelope::ok(format!("{} fuel requests", requests.len()), requests))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
  #[serde(flatten)]
  pub request:     FuelRequest,
  pub receipt_url: Option<String>,
}

/// `GET /requests/{id}`
pub async fn get_one<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Reply<RequestDetail>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let id = RequestId(id?.0);
  let store = ctl.store();
  let request = store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("fuel request {id} not found")))?;
  let receipt = store.get_receipt(id).await.map_err(ApiError::store)?;

  let detail = RequestDetail {
    request,
    receipt_url: receipt.map(|r| r.url().to_owned()),
  };
  Ok(envelope::ok("Fuel request", detail))
}

// ─── Decide ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
  pub status: Status,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionView {
  pub request_id: RequestId,
  pub previous:   Status,
  pub status:     Status,
}

/// `POST /requests/{id}/decision`, body: `{"status":"Approved"|"Rejected"}`
pub async fn decide<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  id: Result<Path<i64>, PathRejection>,
  body: Result<Json<DecisionBody>, JsonRejection>,
) -> Result<Reply<TransitionView>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let id = RequestId(id?.0);
  let Json(body) = body?;
  let decision = Decision::try_from(body.status)?;

  let transition = ctl.decide(id, decision).await?;
  let message = envelope::mutation_message(
    &format!("Request {}", transition.status),
    transition.fan_out.is_degraded(),
  );
  let view = TransitionView {
    request_id: transition.request_id,
    previous:   transition.previous,
    status:     transition.status,
  };
  Ok(envelope::ok(message, view))
}
