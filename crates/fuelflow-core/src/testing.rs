//! In-memory fakes for exercising the workflow without a database or network.

use std::{
  collections::{BTreeMap, HashSet},
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  notification::{NewNotification, Notification, NotificationId, NotificationMessage},
  push::{PushError, PushTransport},
  request::{
    ExpenseView, FuelRequest, NewFuelRequest, NewReceipt, Receipt, RequestId,
    RequestSummary, Status,
  },
  store::{NotificationStore, RecipientDirectory, RecordStore, RequestStore, UserStore},
  user::{NewUser, Role, User, UserId},
};

#[derive(Debug, Error)]
#[error("memory store: {0}")]
pub struct MemoryError(&'static str);

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  next_id:       i64,
  users:         BTreeMap<UserId, User>,
  requests:      BTreeMap<RequestId, FuelRequest>,
  receipts:      BTreeMap<RequestId, Receipt>,
  notifications: Vec<Notification>,
}

impl Inner {
  fn next_id(&mut self) -> i64 {
    self.next_id += 1;
    self.next_id
  }
}

/// Mutex-guarded maps with switches to simulate an unavailable backend.
#[derive(Default)]
pub struct MemoryStore {
  inner:              Mutex<Inner>,
  fail_writes:        AtomicBool,
  fail_notifications: AtomicBool,
  fail_directory:     AtomicBool,
}

impl MemoryStore {
  pub async fn user(&self, name: &str, role: Role, token: Option<&str>) -> User {
    let user = self
      .add_user(NewUser { username: name.into(), email: None, role })
      .await
      .unwrap();
    if let Some(t) = token {
      self.set_push_token(user.user_id, t.into()).await.unwrap();
    }
    self.get_user(user.user_id).await.unwrap().unwrap()
  }

  pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst) }

  pub fn fail_notifications(&self, on: bool) {
    self.fail_notifications.store(on, Ordering::SeqCst)
  }

  pub fn fail_directory(&self, on: bool) {
    self.fail_directory.store(on, Ordering::SeqCst)
  }

  pub fn notification_count(&self) -> usize {
    self.inner.lock().unwrap().notifications.len()
  }

  pub fn notifications_for(&self, user: UserId) -> Vec<Notification> {
    let inner = self.inner.lock().unwrap();
    inner.notifications.iter().filter(|n| n.recipient == user).cloned().collect()
  }

  pub fn request_count(&self) -> usize { self.inner.lock().unwrap().requests.len() }

  fn check(&self, flag: &AtomicBool, what: &'static str) -> Result<(), MemoryError> {
    if flag.load(Ordering::SeqCst) {
      Err(MemoryError(what))
    } else {
      Ok(())
    }
  }
}

impl RecordStore for MemoryStore {
  type Error = MemoryError;
}

impl RequestStore for MemoryStore {
  async fn create(&self, input: NewFuelRequest) -> Result<FuelRequest, MemoryError> {
    self.check(&self.fail_writes, "write failed")?;
    let mut inner = self.inner.lock().unwrap();
    let request = FuelRequest {
      request_id: RequestId(inner.next_id()),
      driver_id:  input.driver_id,
      facts:      input.facts,
      status:     Status::Pending,
      created_at: Utc::now(),
    };
    if let Some(r) = input.receipt {
      inner.receipts.insert(request.request_id, Receipt {
        request_id: request.request_id,
        file_ref:   r.file_ref,
        media_type: r.media_type,
        created_at: request.created_at,
      });
    }
    inner.requests.insert(request.request_id, request.clone());
    Ok(request)
  }

  async fn attach_receipt(
    &self,
    id: RequestId,
    receipt: NewReceipt,
  ) -> Result<bool, MemoryError> {
    self.check(&self.fail_writes, "write failed")?;
    let mut inner = self.inner.lock().unwrap();
    if !inner.requests.contains_key(&id) || inner.receipts.contains_key(&id) {
      return Ok(false);
    }
    inner.receipts.insert(id, Receipt {
      request_id: id,
      file_ref:   receipt.file_ref,
      media_type: receipt.media_type,
      created_at: Utc::now(),
    });
    Ok(true)
  }

  async fn update_status(
    &self,
    id: RequestId,
    expected: Status,
    next: Status,
  ) -> Result<Option<Status>, MemoryError> {
    self.check(&self.fail_writes, "write failed")?;
    let mut inner = self.inner.lock().unwrap();
    let Some(request) = inner.requests.get_mut(&id) else {
      return Ok(None);
    };
    let previous = request.status;
    if previous == expected {
      request.status = next;
    }
    Ok(Some(previous))
  }

  async fn get(&self, id: RequestId) -> Result<Option<FuelRequest>, MemoryError> {
    Ok(self.inner.lock().unwrap().requests.get(&id).cloned())
  }

  async fn get_receipt(&self, id: RequestId) -> Result<Option<Receipt>, MemoryError> {
    Ok(self.inner.lock().unwrap().receipts.get(&id).cloned())
  }

  async fn list_by_owner(&self, driver: UserId) -> Result<Vec<FuelRequest>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(inner.requests.values().rev().filter(|r| r.driver_id == driver).cloned().collect())
  }

  async fn list_by_status(
    &self,
    statuses: Vec<Status>,
  ) -> Result<Vec<FuelRequest>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .requests
        .values()
        .rev()
        .filter(|r| statuses.contains(&r.status))
        .cloned()
        .collect(),
    )
  }

  async fn list_expenses(&self) -> Result<Vec<ExpenseView>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .requests
        .values()
        .rev()
        .filter(|r| r.status == Status::Approved)
        .map(|r| ExpenseView {
          request:     r.clone(),
          driver_name: inner.users.get(&r.driver_id).map(|u| u.username.clone()),
          receipt_url: inner.receipts.get(&r.request_id).map(|rc| rc.file_ref.clone()),
        })
        .collect(),
    )
  }

  async fn summary(&self) -> Result<RequestSummary, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(RequestSummary {
      total_requests: inner.requests.len() as u64,
      total_amount:   inner.requests.values().map(|r| r.facts.total).sum(),
      total_liters:   inner.requests.values().map(|r| r.facts.liters).sum(),
    })
  }
}

impl RecipientDirectory for MemoryStore {
  async fn resolve_for_role(&self, role: Role) -> Result<Vec<User>, MemoryError> {
    self.check(&self.fail_directory, "directory unavailable")?;
    let inner = self.inner.lock().unwrap();
    Ok(inner.users.values().filter(|u| u.role == role).cloned().collect())
  }

  async fn resolve_owner(&self, request: RequestId) -> Result<Option<User>, MemoryError> {
    self.check(&self.fail_directory, "directory unavailable")?;
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .requests
        .get(&request)
        .and_then(|r| inner.users.get(&r.driver_id))
        .cloned(),
    )
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>, MemoryError> {
    Ok(self.inner.lock().unwrap().users.get(&id).cloned())
  }
}

impl UserStore for MemoryStore {
  async fn add_user(&self, input: NewUser) -> Result<User, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    let user = User {
      user_id:    UserId(inner.next_id()),
      username:   input.username,
      email:      input.email,
      role:       input.role,
      push_token: None,
      created_at: Utc::now(),
    };
    inner.users.insert(user.user_id, user.clone());
    Ok(user)
  }

  async fn set_push_token(&self, id: UserId, token: String) -> Result<bool, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    Ok(match inner.users.get_mut(&id) {
      Some(u) => {
        u.push_token = Some(token);
        true
      }
      None => false,
    })
  }
}

impl NotificationStore for MemoryStore {
  async fn record(&self, input: NewNotification) -> Result<Notification, MemoryError> {
    self.check(&self.fail_notifications, "notification write failed")?;
    let mut inner = self.inner.lock().unwrap();
    let n = Notification {
      notification_id: NotificationId(inner.next_id()),
      recipient:       input.recipient,
      title:           input.title,
      message:         input.message,
      is_read:         false,
      created_at:      Utc::now(),
    };
    inner.notifications.push(n.clone());
    Ok(n)
  }

  async fn list_for_user(
    &self,
    recipient: UserId,
    unread_only: bool,
  ) -> Result<Vec<Notification>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .notifications
        .iter()
        .rev()
        .filter(|n| n.recipient == recipient && !(unread_only && n.is_read))
        .cloned()
        .collect(),
    )
  }

  async fn mark_read(&self, id: NotificationId) -> Result<bool, MemoryError> {
    let mut inner = self.inner.lock().unwrap();
    Ok(match inner.notifications.iter_mut().find(|n| n.notification_id == id) {
      Some(n) => {
        n.is_read = true;
        true
      }
      None => false,
    })
  }
}

// ─── Push ────────────────────────────────────────────────────────────────────

/// Records every attempt; tokens registered with [`fail_token`] error out.
///
/// Each send yields once mid-flight so overlapping sends can be observed
/// through [`peak_in_flight`].
///
/// [`fail_token`]: RecordingPush::fail_token
/// [`peak_in_flight`]: RecordingPush::peak_in_flight
#[derive(Default)]
pub struct RecordingPush {
  sent:      Mutex<Vec<(String, NotificationMessage)>>,
  failing:   Mutex<HashSet<String>>,
  attempts:  AtomicUsize,
  in_flight: AtomicUsize,
  peak:      AtomicUsize,
}

impl RecordingPush {
  pub fn fail_token(&self, token: &str) {
    self.failing.lock().unwrap().insert(token.to_string());
  }

  /// Successful sends only.
  pub fn sent(&self) -> Vec<(String, NotificationMessage)> {
    self.sent.lock().unwrap().clone()
  }

  /// Every attempt, successful or not.
  pub fn attempts(&self) -> usize { self.attempts.load(Ordering::SeqCst) }

  /// Most sends that were ever in progress at once.
  pub fn peak_in_flight(&self) -> usize { self.peak.load(Ordering::SeqCst) }
}

impl PushTransport for RecordingPush {
  async fn send(&self, token: &str, message: &NotificationMessage) -> Result<(), PushError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(now, Ordering::SeqCst);
    tokio::task::yield_now().await;
    self.in_flight.fetch_sub(1, Ordering::SeqCst);

    if self.failing.lock().unwrap().contains(token) {
      return Err(PushError::Transport("simulated network error".into()));
    }
    self.sent.lock().unwrap().push((token.to_string(), message.clone()));
    Ok(())
  }
}
