//! Error type for `fuelflow-push-fcm`.
//!
//! These only cover building the client. Delivery failures are reported as
//! `fuelflow_core::push::PushError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid push endpoint {endpoint:?}: {reason}")]
  InvalidEndpoint { endpoint: String, reason: String },

  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
