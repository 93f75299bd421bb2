//! Read-only finance views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/finance/expenses` | Approved requests with driver and receipt |
//! | `GET`  | `/finance/summary`  | Count and totals over every request |

use std::sync::Arc;

use axum::extract::State;
use fuelflow_core::{
  lifecycle::LifecycleController,
  push::PushTransport,
  request::{ExpenseView, RequestSummary},
  store::FuelStore,
};

use crate::{
  envelope::{self, Reply},
  error::ApiError,
};

/// `GET /finance/expenses`
pub async fn expenses<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
) -> Result<Reply<Vec<ExpenseView>>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let expenses = ctl.store().list_expenses().await.map_err(ApiError::store)?;
  Ok(envelope::ok(format!("{} approved expenses", expenses.len()), expenses))
}

/// `GET /finance/summary`
pub async fn summary<S, P>(
  State(ctl): State<Arc<LifecycleController<S, P>>>,
) -> Result<Reply<RequestSummary>, ApiError>
where
  S: FuelStore,
  P: PushTransport,
{
  let summary = ctl.store().summary().await.map_err(ApiError::store)?;
  Ok(envelope::ok("Fuel request summary", summary))
}
