//! Record-store traits consumed by the workflow.
//!
//! The traits are implemented by storage backends (e.g.
//! `fuelflow-store-sqlite`). The lifecycle controller and the HTTP layer
//! depend on these abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  notification::{NewNotification, Notification, NotificationId},
  request::{
    ExpenseView, FuelRequest, NewFuelRequest, NewReceipt, Receipt, RequestId,
    RequestSummary, Status,
  },
  user::{NewUser, Role, User, UserId},
};

// ─── Base ────────────────────────────────────────────────────────────────────

/// Shared error type for every store trait a backend implements.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Transactional CRUD over fuel requests. Source of truth for status.
///
/// The store has no notion of legal transitions; it only guarantees that each
/// write is atomic per record.
pub trait RequestStore: RecordStore {
  /// Persist a new request with `Status::Pending`, together with its receipt
  /// if one is given, in a single transaction.
  fn create(
    &self,
    input: NewFuelRequest,
  ) -> impl Future<Output = Result<FuelRequest, Self::Error>> + Send + '_;

  /// Link a receipt to an existing request.
  ///
  /// Returns `Ok(false)` if the request does not exist or already has a
  /// receipt; receipts are never replaced.
  fn attach_receipt(
    &self,
    id: RequestId,
    receipt: NewReceipt,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Atomically set the status to `next` iff it currently equals `expected`.
  ///
  /// Returns the status observed before the write, or `None` if the request
  /// does not exist. When the returned status differs from `expected`
  /// nothing was written. Concurrent callers are serialised so exactly one of
  /// them can observe `expected`.
  fn update_status(
    &self,
    id: RequestId,
    expected: Status,
    next: Status,
  ) -> impl Future<Output = Result<Option<Status>, Self::Error>> + Send + '_;

  fn get(
    &self,
    id: RequestId,
  ) -> impl Future<Output = Result<Option<FuelRequest>, Self::Error>> + Send + '_;

  fn get_receipt(
    &self,
    id: RequestId,
  ) -> impl Future<Output = Result<Option<Receipt>, Self::Error>> + Send + '_;

  /// All requests submitted by `driver`, newest first.
  fn list_by_owner(
    &self,
    driver: UserId,
  ) -> impl Future<Output = Result<Vec<FuelRequest>, Self::Error>> + Send + '_;

  /// All requests whose status is in `statuses`, newest first.
  fn list_by_status(
    &self,
    statuses: Vec<Status>,
  ) -> impl Future<Output = Result<Vec<FuelRequest>, Self::Error>> + Send + '_;

  /// Approved requests joined with their driver's name and receipt URL.
  fn list_expenses(
    &self,
  ) -> impl Future<Output = Result<Vec<ExpenseView>, Self::Error>> + Send + '_;

  fn summary(
    &self,
  ) -> impl Future<Output = Result<RequestSummary, Self::Error>> + Send + '_;
}

// ─── Recipients ──────────────────────────────────────────────────────────────

/// Read-only queries that decide who hears about an event.
///
/// Empty results are not errors: an event simply fans out to nobody.
pub trait RecipientDirectory: RecordStore {
  fn resolve_for_role(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// The driver who submitted `request`, or `None` if either is unknown.
  fn resolve_owner(
    &self,
    request: RequestId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The slice of the identity collaborator this system writes to.
pub trait UserStore: RecordStore {
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Store or replace a user's push token. `Ok(false)` if the user is unknown.
  fn set_push_token(
    &self,
    id: UserId,
    token: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// Durable in-app notifications; the record of truth for every notice.
pub trait NotificationStore: RecordStore {
  /// Persist one unread notification.
  fn record(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// Notifications addressed to `recipient`, newest first.
  fn list_for_user(
    &self,
    recipient: UserId,
    unread_only: bool,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  /// Read acknowledgement. `Ok(false)` if the notification is unknown.
  fn mark_read(
    &self,
    id: NotificationId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Bundle ──────────────────────────────────────────────────────────────────

/// Everything the workflow needs from one record store.
pub trait FuelStore:
  RequestStore + RecipientDirectory + UserStore + NotificationStore
{
}

impl<T> FuelStore for T where
  T: RequestStore + RecipientDirectory + UserStore + NotificationStore
{
}
