//! The push-delivery capability.
//!
//! Delivery is best-effort: one attempt per recipient, no retry here. Any
//! retry policy belongs to the transport itself.

use std::future::Future;

use thiserror::Error;

use crate::notification::NotificationMessage;

#[derive(Debug, Error)]
pub enum PushError {
  /// No credential configured; the attempt was skipped.
  #[error("push transport is not configured")]
  NotConfigured,

  /// The request never produced a response (DNS, TLS, timeout, ...).
  #[error("push transport error: {0}")]
  Transport(String),

  /// The push service answered but refused the message.
  #[error("push rejected ({status}): {reason}")]
  Rejected { status: u16, reason: String },
}

/// Opaque `send(token, title, body, data)` capability.
pub trait PushTransport: Send + Sync {
  fn send<'a>(
    &'a self,
    token: &'a str,
    message: &'a NotificationMessage,
  ) -> impl Future<Output = Result<(), PushError>> + Send + 'a;
}
