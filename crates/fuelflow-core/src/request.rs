//! Fuel requests: the records whose lifecycle this crate governs.
//!
//! A request's purchase facts are immutable once submitted. Only its
//! [`Status`] moves, and only out of [`Status::Pending`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result, user::UserId};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned identifier of a fuel request.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle state of a fuel request.
///
/// ```text
/// Pending ──decide(Approved)──> Approved
///    └─────decide(Rejected)──> Rejected
/// ```
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
pub enum Status {
  Pending,
  Approved,
  Rejected,
}

impl Status {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Approved and Rejected have no outgoing transitions.
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

/// A manager's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Decision {
  Approved,
  Rejected,
}

impl From<Decision> for Status {
  fn from(d: Decision) -> Self {
    match d {
      Decision::Approved => Status::Approved,
      Decision::Rejected => Status::Rejected,
    }
  }
}

impl TryFrom<Status> for Decision {
  type Error = Error;

  fn try_from(s: Status) -> Result<Self> {
    match s {
      Status::Approved => Ok(Decision::Approved),
      Status::Rejected => Ok(Decision::Rejected),
      Status::Pending => {
        Err(Error::Validation("decision must be Approved or Rejected".into()))
      }
    }
  }
}

// ─── Purchase facts ──────────────────────────────────────────────────────────

/// What the driver bought. Immutable once the request exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseFacts {
  pub vehicle_name:   Option<String>,
  pub vehicle_number: Option<String>,
  pub odometer:       Option<f64>,
  pub liters:         f64,
  pub rate:           f64,
  pub total:          f64,
  pub station:        Option<String>,
  pub notes:          Option<String>,
}

impl PurchaseFacts {
  /// Reject negative or non-finite quantities.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("liters", self.liters),
      ("rate", self.rate),
      ("total", self.total),
    ];
    for (field, value) in required {
      check_quantity(field, value)?;
    }
    if let Some(odo) = self.odometer {
      check_quantity("odometer", odo)?;
    }
    Ok(())
  }
}

fn check_quantity(field: &str, value: f64) -> Result<()> {
  if !value.is_finite() {
    return Err(Error::Validation(format!("{field} must be a finite number")));
  }
  if value < 0.0 {
    return Err(Error::Validation(format!("{field} must be non-negative")));
  }
  Ok(())
}

// ─── Receipt ─────────────────────────────────────────────────────────────────

/// Reference to an already-stored receipt file, supplied at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceipt {
  pub file_ref:   String,
  pub media_type: String,
}

/// A receipt linked to a request. At most one per request, never replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
  pub request_id: RequestId,
  pub file_ref:   String,
  pub media_type: String,
  pub created_at: DateTime<Utc>,
}

impl Receipt {
  /// The file reference doubles as the public URL of the upload.
  pub fn url(&self) -> &str { &self.file_ref }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Input to [`RequestStore::create`](crate::store::RequestStore::create).
#[derive(Debug, Clone)]
pub struct NewFuelRequest {
  pub driver_id: UserId,
  pub facts:     PurchaseFacts,
  pub receipt:   Option<NewReceipt>,
}

/// A persisted fuel request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelRequest {
  pub request_id: RequestId,
  pub driver_id:  UserId,
  #[serde(flatten)]
  pub facts:      PurchaseFacts,
  pub status:     Status,
  pub created_at: DateTime<Utc>,
}

/// Read model for finance: an approved request with its driver and receipt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
  #[serde(flatten)]
  pub request:     FuelRequest,
  pub driver_name: Option<String>,
  pub receipt_url: Option<String>,
}

/// Totals over every request regardless of status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
  pub total_requests: u64,
  pub total_amount:   f64,
  pub total_liters:   f64,
}
