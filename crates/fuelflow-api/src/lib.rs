//! JSON REST API for the fuel-request workflow.
//!
//! Exposes an axum [`Router`] backed by a [`LifecycleController`]. Mutations
//! go through the controller; reads go straight to its record store. Auth,
//! TLS, and transport concerns are the caller's responsibility.
//!
//! Every response body is an [`envelope::Envelope`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fuelflow_api::api_router(controller.clone()))
//! ```

pub mod envelope;
pub mod error;
pub mod finance;
pub mod notifications;
pub mod requests;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use fuelflow_core::{lifecycle::LifecycleController, push::PushTransport, store::FuelStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `controller`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P>(controller: Arc<LifecycleController<S, P>>) -> Router<()>
where
  S: FuelStore + 'static,
  P: PushTransport + 'static,
{
  Router::new()
    // Requests
    .route("/requests", get(requests::list::<S, P>).post(requests::submit::<S, P>))
    .route("/requests/{id}", get(requests::get_one::<S, P>))
    .route("/requests/{id}/decision", post(requests::decide::<S, P>))
    // Users
    .route("/users/{id}", get(users::get_one::<S, P>))
    .route("/users/{id}/push-token", put(users::set_push_token::<S, P>))
    .route("/users/{id}/notifications", get(users::notifications::<S, P>))
    // Notifications
    .route("/notifications/{id}/read", post(notifications::mark_read::<S, P>))
    // Finance
    .route("/finance/expenses", get(finance::expenses::<S, P>))
    .route("/finance/summary", get(finance::summary::<S, P>))
    .with_state(controller)
}

// ─── Integration tests ───────────────────────────────────────────────────────
