//! The `{success, message, data?}` body every endpoint answers with.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Appended to the message of a mutation whose fan-out was degraded.
pub const DEGRADED_SUFFIX: &str = "; some notifications could not be recorded";

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
}

impl<T> Envelope<T> {
  pub fn failure(message: impl Into<String>) -> Self {
    Self { success: false, message: message.into(), data: None }
  }
}

pub type Reply<T> = (StatusCode, Json<Envelope<T>>);

pub fn ok<T>(message: impl Into<String>, data: T) -> Reply<T> {
  with_status(StatusCode::OK, message, data)
}

pub fn created<T>(message: impl Into<String>, data: T) -> Reply<T> {
  with_status(StatusCode::CREATED, message, data)
}

/// Success without a payload; `data` is omitted.
pub fn done(message: impl Into<String>) -> Reply<()> {
  let envelope = Envelope { success: true, message: message.into(), data: None };
  (StatusCode::OK, Json(envelope))
}

fn with_status<T>(status: StatusCode, message: impl Into<String>, data: T) -> Reply<T> {
  let envelope = Envelope { success: true, message: message.into(), data: Some(data) };
  (status, Json(envelope))
}

/// `message`, flagged when some recipient may be missing their notice.
pub fn mutation_message(message: &str, degraded: bool) -> String {
  if degraded {
    format!("{message}{DEGRADED_SUFFIX}")
  } else {
    message.to_owned()
  }
}
