//! Error types for `fuelflow-core`.

use thiserror::Error;

use crate::{
  request::{RequestId, Status},
  user::UserId,
};

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed input; nothing was written.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("fuel request not found: {0}")]
  RequestNotFound(RequestId),

  /// A decision on a request that has already left `Pending`.
  #[error("fuel request {request_id} is already {from}; cannot move to {to}")]
  InvalidTransition {
    request_id: RequestId,
    from:       Status,
    to:         Status,
  },

  /// The record store was unavailable or a write failed.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
