//! User accounts as seen by the workflow.
//!
//! Accounts belong to an external identity collaborator; the workflow only
//! reads a user's role (to pick recipients) and push token (to deliver).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
pub enum Role {
  Driver,
  Manager,
  Finance,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:    UserId,
  pub username:   String,
  pub email:      Option<String>,
  pub role:       Role,
  /// Absent means "skip push, keep the in-app record".
  pub push_token: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl User {
  /// The push token, ignoring blank strings left behind by clients.
  pub fn push_token(&self) -> Option<&str> {
    self.push_token.as_deref().filter(|t| !t.trim().is_empty())
  }
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub email:    Option<String>,
  pub role:     Role,
}
