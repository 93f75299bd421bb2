//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Status and role are stored as
//! their variant names (`Pending`, `Manager`, ...). Identifiers are SQLite
//! integer row ids.

use chrono::{DateTime, Utc};
use fuelflow_core::{
  notification::{Notification, NotificationId},
  request::{FuelRequest, PurchaseFacts, Receipt, RequestId, Status},
  user::{Role, User, UserId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<Status> {
  s.parse().map_err(|_| Error::UnknownValue { column: "status", value: s.to_owned() })
}

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::UnknownValue { column: "role", value: s.to_owned() })
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column list matching [`RawRequest::from_row`].
pub const REQUEST_COLUMNS: &str = "r.request_id, r.driver_id, r.vehicle_name, \
   r.vehicle_number, r.odometer, r.liters, r.rate, r.total, r.station, r.notes, \
   r.status, r.created_at";

/// A `fuel_requests` row before validation of its text columns.
pub struct RawRequest {
  pub request_id:     i64,
  pub driver_id:      i64,
  pub vehicle_name:   Option<String>,
  pub vehicle_number: Option<String>,
  pub odometer:       Option<f64>,
  pub liters:         f64,
  pub rate:           f64,
  pub total:          f64,
  pub station:        Option<String>,
  pub notes:          Option<String>,
  pub status:         String,
  pub created_at:     String,
}

impl RawRequest {
  /// Read the first twelve columns, in [`REQUEST_COLUMNS`] order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      request_id:     row.get(0)?,
      driver_id:      row.get(1)?,
      vehicle_name:   row.get(2)?,
      vehicle_number: row.get(3)?,
      odometer:       row.get(4)?,
      liters:         row.get(5)?,
      rate:           row.get(6)?,
      total:          row.get(7)?,
      station:        row.get(8)?,
      notes:          row.get(9)?,
      status:         row.get(10)?,
      created_at:     row.get(11)?,
    })
  }

  pub fn into_request(self) -> Result<FuelRequest> {
    Ok(FuelRequest {
      request_id: RequestId(self.request_id),
      driver_id:  UserId(self.driver_id),
      facts:      PurchaseFacts {
        vehicle_name:   self.vehicle_name,
        vehicle_number: self.vehicle_number,
        odometer:       self.odometer,
        liters:         self.liters,
        rate:           self.rate,
        total:          self.total,
        station:        self.station,
        notes:          self.notes,
      },
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "u.user_id, u.username, u.email, u.role, u.push_token, u.created_at";

pub struct RawUser {
  pub user_id:    i64,
  pub username:   String,
  pub email:      Option<String>,
  pub role:       String,
  pub push_token: Option<String>,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      role:       row.get(3)?,
      push_token: row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    UserId(self.user_id),
      username:   self.username,
      email:      self.email,
      role:       decode_role(&self.role)?,
      push_token: self.push_token,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawReceipt {
  pub request_id: i64,
  pub file_ref:   String,
  pub media_type: String,
  pub created_at: String,
}

impl RawReceipt {
  pub fn into_receipt(self) -> Result<Receipt> {
    Ok(Receipt {
      request_id: RequestId(self.request_id),
      file_ref:   self.file_ref,
      media_type: self.media_type,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawNotification::from_row`].
pub const NOTIFICATION_COLUMNS: &str =
  "notification_id, user_id, title, message, is_read, created_at";

pub struct RawNotification {
  pub notification_id: i64,
  pub user_id:         i64,
  pub title:           String,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      user_id:         row.get(1)?,
      title:           row.get(2)?,
      message:         row.get(3)?,
      is_read:         row.get(4)?,
      created_at:      row.get(5)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: NotificationId(self.notification_id),
      recipient:       UserId(self.user_id),
      title:           self.title,
      message:         self.message,
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
