//! `POST /notifications/{id}/read`: the read acknowledgement.

use std::sync::Arc;

use axum::extract::{Path, State, rejection::PathRejection};
use fuelflow_core::{
  lifecycle::LifecycleController,
  notification::NotificationId,
  push::PushTransport,
  store::FuelStore,
};

use crate::{
  envelope::{self, Reply},
  error::ApiError,
};

pub async fn mark_read<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
  id: Result<Path<i64>, PathRejection>,
) -> Result<Reply<()>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let id = NotificationId(id?.0);
  let marked = ctl.store().mark_read(id).await.map_err(ApiError::store)?;
  if !marked {
    return Err(ApiError::NotFound(format!("notification {id} not found")));
  }
  Ok(envelope::done("Notification marked as read"))
}
