//! Integration tests for `SqliteStore` against an in-memory database.

use fuelflow_core::{
  notification::NewNotification,
  request::{NewFuelRequest, NewReceipt, PurchaseFacts, RequestId, Status},
  store::{NotificationStore, RecipientDirectory, RequestStore, UserStore},
  user::{NewUser, Role, User, UserId},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str, role: Role) -> User {
  s.add_user(NewUser { username: name.into(), email: None, role })
    .await
    .unwrap()
}

fn facts(liters: f64, total: f64) -> PurchaseFacts {
  PurchaseFacts {
    vehicle_name: Some("Tata Ace".into()),
    liters,
    rate: total / liters,
    total,
    ..Default::default()
  }
}

fn new_request(driver: UserId) -> NewFuelRequest {
  NewFuelRequest { driver_id: driver, facts: facts(10.0, 1000.0), receipt: None }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let u = s
    .add_user(NewUser {
      username: "dan".into(),
      email:    Some("dan@example.com".into()),
      role:     Role::Driver,
    })
    .await
    .unwrap();

  let fetched = s.get_user(u.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.username, "dan");
  assert_eq!(fetched.email.as_deref(), Some("dan@example.com"));
  assert_eq!(fetched.role, Role::Driver);
  assert!(fetched.push_token.is_none());
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(UserId(404)).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  user(&s, "dan", Role::Driver).await;
  let dup = s
    .add_user(NewUser { username: "dan".into(), email: None, role: Role::Manager })
    .await;
  assert!(dup.is_err());
}

#[tokio::test]
async fn set_push_token_replaces_previous() {
  let s = store().await;
  let u = user(&s, "mia", Role::Manager).await;

  assert!(s.set_push_token(u.user_id, "first".into()).await.unwrap());
  assert!(s.set_push_token(u.user_id, "second".into()).await.unwrap());
  assert!(!s.set_push_token(UserId(999), "x".into()).await.unwrap());

  let fetched = s.get_user(u.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.push_token(), Some("second"));
}

#[tokio::test]
async fn resolve_for_role_filters_by_role() {
  let s = store().await;
  let a = user(&s, "mia", Role::Manager).await;
  user(&s, "dan", Role::Driver).await;
  let b = user(&s, "max", Role::Manager).await;

  let managers = s.resolve_for_role(Role::Manager).await.unwrap();
  let ids: Vec<_> = managers.iter().map(|u| u.user_id).collect();
  assert_eq!(ids, vec![a.user_id, b.user_id]);

  assert!(s.resolve_for_role(Role::Admin).await.unwrap().is_empty());
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_starts_pending() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;

  let r = s.create(new_request(d.user_id)).await.unwrap();
  assert_eq!(r.status, Status::Pending);

  let fetched = s.get(r.request_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, Status::Pending);
  assert_eq!(fetched.driver_id, d.user_id);
  assert_eq!(fetched.facts, r.facts);
}

#[tokio::test]
async fn create_for_unknown_driver_fails() {
  let s = store().await;
  assert!(s.create(new_request(UserId(77))).await.is_err());
}

#[tokio::test]
async fn create_stores_receipt_in_same_write() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;

  let r = s
    .create(NewFuelRequest {
      receipt: Some(NewReceipt {
        file_ref:   "/uploads/r1.jpg".into(),
        media_type: "image/jpeg".into(),
      }),
      ..new_request(d.user_id)
    })
    .await
    .unwrap();

  let rc = s.get_receipt(r.request_id).await.unwrap().unwrap();
  assert_eq!(rc.request_id, r.request_id);
  assert_eq!(rc.url(), "/uploads/r1.jpg");
  assert_eq!(rc.media_type, "image/jpeg");
}

#[tokio::test]
async fn attach_receipt_never_replaces() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;
  let r = s.create(new_request(d.user_id)).await.unwrap();
  let receipt = |f: &str| NewReceipt { file_ref: f.into(), media_type: "image/png".into() };

  assert!(s.attach_receipt(r.request_id, receipt("/a.png")).await.unwrap());
  assert!(!s.attach_receipt(r.request_id, receipt("/b.png")).await.unwrap());
  assert!(!s.attach_receipt(RequestId(999), receipt("/c.png")).await.unwrap());

  let rc = s.get_receipt(r.request_id).await.unwrap().unwrap();
  assert_eq!(rc.url(), "/a.png");
}

#[tokio::test]
async fn update_status_applies_only_from_expected() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;
  let r = s.create(new_request(d.user_id)).await.unwrap();

  let prev = s
    .update_status(r.request_id, Status::Pending, Status::Approved)
    .await
    .unwrap();
  assert_eq!(prev, Some(Status::Pending));

  let prev = s
    .update_status(r.request_id, Status::Pending, Status::Rejected)
    .await
    .unwrap();
  assert_eq!(prev, Some(Status::Approved));

  let fetched = s.get(r.request_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, Status::Approved);
}

#[tokio::test]
async fn update_status_missing_request_returns_none() {
  let s = store().await;
  let prev = s
    .update_status(RequestId(5), Status::Pending, Status::Approved)
    .await
    .unwrap();
  assert!(prev.is_none());
}

#[tokio::test]
async fn concurrent_updates_have_one_winner() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;
  let r = s.create(new_request(d.user_id)).await.unwrap();
  let id = r.request_id;

  let (s1, s2) = (s.clone(), s.clone());
  let (a, b) = tokio::join!(
    tokio::spawn(async move { s1.update_status(id, Status::Pending, Status::Approved).await }),
    tokio::spawn(async move { s2.update_status(id, Status::Pending, Status::Rejected).await }),
  );
  let a = a.unwrap().unwrap();
  let b = b.unwrap().unwrap();

  let winners = [a, b].iter().filter(|p| **p == Some(Status::Pending)).count();
  assert_eq!(winners, 1);
}

#[tokio::test]
async fn list_by_owner_newest_first() {
  let s = store().await;
  let d1 = user(&s, "dan", Role::Driver).await;
  let d2 = user(&s, "dee", Role::Driver).await;
  let first  = s.create(new_request(d1.user_id)).await.unwrap();
  s.create(new_request(d2.user_id)).await.unwrap();
  let second = s.create(new_request(d1.user_id)).await.unwrap();

  let mine = s.list_by_owner(d1.user_id).await.unwrap();
  let ids: Vec<_> = mine.iter().map(|r| r.request_id).collect();
  assert_eq!(ids, vec![second.request_id, first.request_id]);
}

#[tokio::test]
async fn list_by_status_matches_any_of() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;
  let a = s.create(new_request(d.user_id)).await.unwrap();
  let b = s.create(new_request(d.user_id)).await.unwrap();
  let c = s.create(new_request(d.user_id)).await.unwrap();
  s.update_status(a.request_id, Status::Pending, Status::Approved).await.unwrap();
  s.update_status(b.request_id, Status::Pending, Status::Rejected).await.unwrap();

  let pending = s.list_by_status(vec![Status::Pending]).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].request_id, c.request_id);

  let decided = s
    .list_by_status(vec![Status::Approved, Status::Rejected])
    .await
    .unwrap();
  let ids: Vec<_> = decided.iter().map(|r| r.request_id).collect();
  assert_eq!(ids, vec![b.request_id, a.request_id]);

  assert!(s.list_by_status(vec![]).await.unwrap().is_empty());
}

// ─── Finance ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn expenses_list_only_approved_with_driver_and_receipt() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;
  let with_receipt = s
    .create(NewFuelRequest {
      receipt: Some(NewReceipt { file_ref: "/r.jpg".into(), media_type: "image/jpeg".into() }),
      ..new_request(d.user_id)
    })
    .await
    .unwrap();
  let without = s.create(new_request(d.user_id)).await.unwrap();
  s.create(new_request(d.user_id)).await.unwrap();
  s.update_status(with_receipt.request_id, Status::Pending, Status::Approved)
    .await
    .unwrap();
  s.update_status(without.request_id, Status::Pending, Status::Approved)
    .await
    .unwrap();

  let expenses = s.list_expenses().await.unwrap();
  assert_eq!(expenses.len(), 2);
  assert_eq!(expenses[0].request.request_id, without.request_id);
  assert!(expenses[0].receipt_url.is_none());
  assert_eq!(expenses[1].driver_name.as_deref(), Some("dan"));
  assert_eq!(expenses[1].receipt_url.as_deref(), Some("/r.jpg"));
}

#[tokio::test]
async fn summary_of_empty_store_is_zero() {
  let s = store().await;
  let sum = s.summary().await.unwrap();
  assert_eq!(sum.total_requests, 0);
  assert_eq!(sum.total_amount, 0.0);
  assert_eq!(sum.total_liters, 0.0);
}

#[tokio::test]
async fn summary_totals_every_request() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;
  s.create(NewFuelRequest { facts: facts(10.0, 1000.0), ..new_request(d.user_id) })
    .await
    .unwrap();
  s.create(NewFuelRequest { facts: facts(5.0, 520.0), ..new_request(d.user_id) })
    .await
    .unwrap();

  let sum = s.summary().await.unwrap();
  assert_eq!(sum.total_requests, 2);
  assert_eq!(sum.total_amount, 1520.0);
  assert_eq!(sum.total_liters, 15.0);
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_owner_returns_driver() {
  let s = store().await;
  let d = user(&s, "dan", Role::Driver).await;
  let r = s.create(new_request(d.user_id)).await.unwrap();

  let owner = s.resolve_owner(r.request_id).await.unwrap().unwrap();
  assert_eq!(owner.user_id, d.user_id);
  assert!(s.resolve_owner(RequestId(404)).await.unwrap().is_none());
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notifications_start_unread_and_can_be_marked() {
  let s = store().await;
  let m = user(&s, "mia", Role::Manager).await;
  let note = |t: &str| NewNotification {
    recipient: m.user_id,
    title:     t.into(),
    message:   "body".into(),
  };

  let first  = s.record(note("one")).await.unwrap();
  let second = s.record(note("two")).await.unwrap();
  assert!(!first.is_read);

  let all = s.list_for_user(m.user_id, false).await.unwrap();
  let ids: Vec<_> = all.iter().map(|n| n.notification_id).collect();
  assert_eq!(ids, vec![second.notification_id, first.notification_id]);

  assert!(s.mark_read(first.notification_id).await.unwrap());
  let unread = s.list_for_user(m.user_id, true).await.unwrap();
  assert_eq!(unread.len(), 1);
  assert_eq!(unread[0].notification_id, second.notification_id);

  let all = s.list_for_user(m.user_id, false).await.unwrap();
  assert!(all.iter().any(|n| n.notification_id == first.notification_id && n.is_read));
}

#[tokio::test]
async fn mark_read_unknown_returns_false() {
  let s = store().await;
  assert!(
    !s.mark_read(fuelflow_core::notification::NotificationId(1))
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn notification_for_unknown_user_fails() {
  let s = store().await;
  let res = s
    .record(NewNotification {
      recipient: UserId(42),
      title:     "t".into(),
      message:   "m".into(),
    })
    .await;
  assert!(res.is_err());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_file_keeps_records() {
  let dir  = std::env::temp_dir().join(format!("fuelflow-test-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("reopen.db");
  let _ = std::fs::remove_file(&path);

  let s = SqliteStore::open(&path).await.unwrap();
  let d = user(&s, "dan", Role::Driver).await;
  let r = s.create(new_request(d.user_id)).await.unwrap();
  s.close().await.unwrap();

  let s = SqliteStore::open(&path).await.unwrap();
  let fetched = s.get(r.request_id).await.unwrap().unwrap();
  assert_eq!(fetched.driver_id, d.user_id);
  s.close().await.unwrap();

  let _ = std::fs::remove_dir_all(&dir);
}
