//! [`SqliteStore`]: the SQLite implementation of the record-store traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;

use fuelflow_core::{
  notification::{NewNotification, Notification, NotificationId},
  request::{
    ExpenseView, FuelRequest, NewFuelRequest, NewReceipt, Receipt, RequestId,
    RequestSummary, Status,
  },
  store::{NotificationStore, RecipientDirectory, RecordStore, RequestStore, UserStore},
  user::{NewUser, Role, User, UserId},
};

use crate::{
  Error, Result,
  encode::{
    NOTIFICATION_COLUMNS, REQUEST_COLUMNS, RawNotification, RawReceipt, RawRequest,
    RawUser, USER_COLUMNS, encode_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A fuel-request record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the connection's own thread, one at a time, so multi-statement
/// transactions never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Flush and close the connection. Pending calls on clones will fail.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_requests(
    &self,
    sql: String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<FuelRequest>> {
    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawRequest::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }
}

impl RecordStore for SqliteStore {
  type Error = Error;
}

// ─── RequestStore impl ───────────────────────────────────────────────────────

impl RequestStore for SqliteStore {
  async fn create(&self, input: NewFuelRequest) -> Result<FuelRequest> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let driver     = input.driver_id.0;
    let facts      = input.facts.clone();
    let receipt    = input.receipt;

    let id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO fuel_requests (
             driver_id, vehicle_name, vehicle_number, odometer,
             liters, rate, total, station, notes, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'Pending', ?10)",
          rusqlite::params![
            driver,
            facts.vehicle_name,
            facts.vehicle_number,
            facts.odometer,
            facts.liters,
            facts.rate,
            facts.total,
            facts.station,
            facts.notes,
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        if let Some(r) = receipt {
          tx.execute(
            "INSERT INTO fuel_receipts (request_id, file_ref, media_type, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, r.file_ref, r.media_type, at_str],
          )?;
        }
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(FuelRequest {
      request_id: RequestId(id),
      driver_id:  input.driver_id,
      facts:      input.facts,
      status:     Status::Pending,
      created_at,
    })
  }

  async fn attach_receipt(&self, id: RequestId, receipt: NewReceipt) -> Result<bool> {
    let at_str = encode_dt(Utc::now());

    let attached = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO fuel_receipts (request_id, file_ref, media_type, created_at)
           SELECT request_id, ?2, ?3, ?4 FROM fuel_requests WHERE request_id = ?1",
          rusqlite::params![id.0, receipt.file_ref, receipt.media_type, at_str],
        )?;
        Ok(changed > 0)
      })
      .await?;
    Ok(attached)
  }

  async fn update_status(
    &self,
    id: RequestId,
    expected: Status,
    next: Status,
  ) -> Result<Option<Status>> {
    let expected_str = expected.as_str();
    let next_str     = next.as_str();

    let previous: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM fuel_requests WHERE request_id = ?1",
            rusqlite::params![id.0],
            |r| r.get(0),
          )
          .optional()?;
        if current.as_deref() == Some(expected_str) {
          tx.execute(
            "UPDATE fuel_requests SET status = ?1 WHERE request_id = ?2",
            rusqlite::params![next_str, id.0],
          )?;
        }
        tx.commit()?;
        Ok(current)
      })
      .await?;

    debug!(request_id = %id, ?previous, %next, "status compare-and-set");
    previous.as_deref().map(crate::encode::decode_status).transpose()
  }

  async fn get(&self, id: RequestId) -> Result<Option<FuelRequest>> {
    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REQUEST_COLUMNS} FROM fuel_requests r WHERE r.request_id = ?1"),
              rusqlite::params![id.0],
              RawRequest::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  async fn get_receipt(&self, id: RequestId) -> Result<Option<Receipt>> {
    let raw: Option<RawReceipt> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT request_id, file_ref, media_type, created_at
               FROM fuel_receipts WHERE request_id = ?1",
              rusqlite::params![id.0],
              |row| {
                Ok(RawReceipt {
                  request_id: row.get(0)?,
                  file_ref:   row.get(1)?,
                  media_type: row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReceipt::into_receipt).transpose()
  }

  async fn list_by_owner(&self, driver: UserId) -> Result<Vec<FuelRequest>> {
    let sql = format!(
      "SELECT {REQUEST_COLUMNS} FROM fuel_requests r
       WHERE r.driver_id = ?1
       ORDER BY r.request_id DESC"
    );
    self.query_requests(sql, vec![driver.0.into()]).await
  }

  async fn list_by_status(&self, statuses: Vec<Status>) -> Result<Vec<FuelRequest>> {
    if statuses.is_empty() {
      return Ok(Vec::new());
    }
    let placeholders = vec!["?"; statuses.len()].join(", ");
    let sql = format!(
      "SELECT {REQUEST_COLUMNS} FROM fuel_requests r
       WHERE r.status IN ({placeholders})
       ORDER BY r.request_id DESC"
    );
    let params = statuses
      .into_iter()
      .map(|s| rusqlite::types::Value::Text(s.as_str().to_owned()))
      .collect();
    self.query_requests(sql, params).await
  }

  async fn list_expenses(&self) -> Result<Vec<ExpenseView>> {
    let rows: Vec<(RawRequest, Option<String>, Option<String>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REQUEST_COLUMNS}, u.username, rc.file_ref
           FROM fuel_requests r
           LEFT JOIN users         u  ON u.user_id     = r.driver_id
           LEFT JOIN fuel_receipts rc ON rc.request_id = r.request_id
           WHERE r.status = 'Approved'
           ORDER BY r.request_id DESC"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok((RawRequest::from_row(row)?, row.get(12)?, row.get(13)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(raw, driver_name, receipt_url)| {
        Ok(ExpenseView { request: raw.into_request()?, driver_name, receipt_url })
      })
      .collect()
  }

  async fn summary(&self) -> Result<RequestSummary> {
    let summary = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*), COALESCE(SUM(total), 0.0), COALESCE(SUM(liters), 0.0)
           FROM fuel_requests",
          [],
          |row| {
            Ok(RequestSummary {
              total_requests: row.get::<_, i64>(0)? as u64,
              total_amount:   row.get(1)?,
              total_liters:   row.get(2)?,
            })
          },
        )?)
      })
      .await?;
    Ok(summary)
  }
}

// ─── RecipientDirectory impl ─────────────────────────────────────────────────

impl RecipientDirectory for SqliteStore {
  async fn resolve_for_role(&self, role: Role) -> Result<Vec<User>> {
    let role_str = role.as_str();

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users u WHERE u.role = ?1 ORDER BY u.user_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![role_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn resolve_owner(&self, request: RequestId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS}
                 FROM fuel_requests r
                 JOIN users u ON u.user_id = r.driver_id
                 WHERE r.request_id = ?1"
              ),
              rusqlite::params![request.0],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = ?1"),
              rusqlite::params![id.0],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  async fn add_user(&self, input: NewUser) -> Result<User> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let role_str   = input.role.as_str();
    let username   = input.username.clone();
    let email      = input.email.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, email, role, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![username, email, role_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User {
      user_id: UserId(id),
      username: input.username,
      email: input.email,
      role: input.role,
      push_token: None,
      created_at,
    })
  }

  async fn set_push_token(&self, id: UserId, token: String) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET push_token = ?1 WHERE user_id = ?2",
          rusqlite::params![token, id.0],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── NotificationStore impl ──────────────────────────────────────────────────

impl NotificationStore for SqliteStore {
  async fn record(&self, input: NewNotification) -> Result<Notification> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let recipient  = input.recipient.0;
    let title      = input.title.clone();
    let message    = input.message.clone();

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (user_id, title, message, is_read, created_at)
           VALUES (?1, ?2, ?3, 0, ?4)",
          rusqlite::params![recipient, title, message, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Notification {
      notification_id: NotificationId(id),
      recipient:       input.recipient,
      title:           input.title,
      message:         input.message,
      is_read:         false,
      created_at,
    })
  }

  async fn list_for_user(
    &self,
    recipient: UserId,
    unread_only: bool,
  ) -> Result<Vec<Notification>> {
    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
           WHERE user_id = ?1 AND (?2 = 0 OR is_read = 0)
           ORDER BY notification_id DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![recipient.0, unread_only],
            RawNotification::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn mark_read(&self, id: NotificationId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1",
          rusqlite::params![id.0],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}
