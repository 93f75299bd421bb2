//! In-app notification records and the message they carry.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  request::{RequestId, Status},
  user::UserId,
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

impl fmt::Display for NotificationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Title, body and string metadata; shared by the stored record and the push
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
  pub title: String,
  pub body:  String,
  pub data:  BTreeMap<String, String>,
}

impl NotificationMessage {
  /// Sent to every manager when a driver submits a request.
  pub fn submitted(request_id: RequestId) -> Self {
    Self {
      title: "New Fuel Request".into(),
      body:  "A driver submitted a fuel request".into(),
      data:  BTreeMap::from([("requestId".into(), request_id.to_string())]),
    }
  }

  /// Sent to the owning driver when a manager decides.
  pub fn decided(request_id: RequestId, status: Status) -> Self {
    Self {
      title: format!("Request {status}"),
      body:  format!("Your fuel request has been {status}."),
      data:  BTreeMap::from([
        ("requestId".into(), request_id.to_string()),
        ("status".into(), status.to_string()),
      ]),
    }
  }
}

/// Input to [`NotificationStore::record`](crate::store::NotificationStore::record).
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub recipient: UserId,
  pub title:     String,
  pub message:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub notification_id: NotificationId,
  pub recipient:       UserId,
  pub title:           String,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decided_message_names_the_status() {
    let msg = NotificationMessage::decided(RequestId(12), Status::Approved);
    assert_eq!(msg.title, "Request Approved");
    assert_eq!(msg.body, "Your fuel request has been Approved.");
    assert_eq!(msg.data["requestId"], "12");
    assert_eq!(msg.data["status"], "Approved");
  }

  #[test]
  fn submitted_message_carries_request_id() {
    let msg = NotificationMessage::submitted(RequestId(4));
    assert_eq!(msg.title, "New Fuel Request");
    assert_eq!(msg.data.get("requestId").map(String::as_str), Some("4"));
  }
}
