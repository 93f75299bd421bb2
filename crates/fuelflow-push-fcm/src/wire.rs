//! FCM legacy request and response bodies.

use std::collections::BTreeMap;

use fuelflow_core::{notification::NotificationMessage, push::PushError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SendBody<'a> {
  pub to:           &'a str,
  pub notification: Alert<'a>,
  pub data:         &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct Alert<'a> {
  pub title: &'a str,
  pub body:  &'a str,
}

impl<'a> SendBody<'a> {
  pub fn new(token: &'a str, message: &'a NotificationMessage) -> Self {
    Self {
      to:           token,
      notification: Alert { title: &message.title, body: &message.body },
      data:         &message.data,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct SendResponse {
  #[serde(default)]
  pub failure: u64,
  #[serde(default)]
  pub results: Vec<SendResult>,
}

#[derive(Debug, Deserialize)]
pub struct SendResult {
  pub error: Option<String>,
}

/// Map an FCM answer to the outcome of one delivery attempt.
///
/// Non-2xx statuses are rejections. A 2xx body that reports `failure > 0` is
/// also a rejection, with the first per-token error as the reason. A 2xx body
/// that is not JSON counts as delivered.
pub fn interpret(status: StatusCode, body: &str) -> Result<(), PushError> {
  if !status.is_success() {
    let reason = body.trim();
    return Err(PushError::Rejected {
      status: status.as_u16(),
      reason: if reason.is_empty() {
        status.canonical_reason().unwrap_or("unknown").to_owned()
      } else {
        reason.to_owned()
      },
    });
  }

  let parsed: SendResponse = serde_json::from_str(body).unwrap_or_default();
  if parsed.failure > 0 {
    let reason = parsed
      .results
      .into_iter()
      .find_map(|r| r.error)
      .unwrap_or_else(|| "delivery failed".to_owned());
    return Err(PushError::Rejected { status: status.as_u16(), reason });
  }
  Ok(())
}
