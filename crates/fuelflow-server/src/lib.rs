//! The fuel-request service: configuration and the top-level HTTP app.
//!
//! `main.rs` wires a [`SqliteStore`](fuelflow_store_sqlite::SqliteStore) and
//! an [`FcmClient`](fuelflow_push_fcm::FcmClient) into a
//! [`LifecycleController`] and serves [`app`].

pub mod settings;

pub use settings::{PushConfig, ServerConfig};

use std::sync::Arc;

use axum::{Json, Router, http::StatusCode, routing::get};
use fuelflow_api::envelope::Envelope;
use fuelflow_core::{lifecycle::LifecycleController, push::PushTransport, store::FuelStore};
use tower_http::trace::TraceLayer;

/// The full router: a liveness root plus the JSON API under `/api`.
///
/// Unknown paths and unsupported methods answer with a failure envelope too.
pub fn app<S, P>(controller: Arc<LifecycleController<S, P>>) -> Router
where
  S: FuelStore + 'static,
  P: PushTransport + 'static,
{
  Router::new()
    .route("/", get(root))
    .nest("/api", fuelflow_api::api_router(controller))
    .method_not_allowed_fallback(method_not_allowed)
    .fallback(not_found)
    .layer(TraceLayer::new_for_http())
}

async fn not_found() -> (StatusCode, Json<Envelope<()>>) {
  (StatusCode::NOT_FOUND, Json(Envelope::failure("not found")))
}

async fn method_not_allowed() -> (StatusCode, Json<Envelope<()>>) {
  (StatusCode::METHOD_NOT_ALLOWED, Json(Envelope::failure("method not allowed")))
}

async fn root() -> Json<Envelope<()>> {
  Json(Envelope {
    success: true,
    message: "Fuel request service is running".into(),
    data:    None,
  })
}
