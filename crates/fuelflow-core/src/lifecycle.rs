//! The request lifecycle controller.
//!
//! Validates and applies status transitions, then fans the resulting event
//! out to its recipients:
//!
//! | Event | Recipients | Message |
//! |-------|------------|---------|
//! | submit | every `Manager` | `New Fuel Request` |
//! | decide | the owning driver | `Request Approved` / `Request Rejected` |
//!
//! Notifications only follow a committed write. Once the write is committed
//! the call succeeds, even if recipients could not be resolved or some
//! notification records could not be written; that degradation is logged
//! and reported through [`FanOut::is_degraded`].

use std::sync::Arc;

use futures::stream::{self, StreamExt as _};
use tracing::{error, info, warn};

use crate::{
  Error, Result,
  dispatch::{DispatchOutcome, Dispatcher},
  notification::NotificationMessage,
  push::PushTransport,
  request::{
    Decision, FuelRequest, NewFuelRequest, NewReceipt, PurchaseFacts, RequestId,
    Status,
  },
  store::FuelStore,
  user::{Role, User, UserId},
};

/// Default bound on parallel dispatches within one fan-out.
pub const DEFAULT_FANOUT_CONCURRENCY: usize = 8;

// ─── Results ─────────────────────────────────────────────────────────────────

/// The dispatches produced by one lifecycle event.
#[derive(Debug, Clone, Default)]
pub struct FanOut {
  pub outcomes:          Vec<DispatchOutcome>,
  /// The recipient query itself failed; nobody was notified.
  pub resolution_failed: bool,
}

impl FanOut {
  fn unresolved() -> Self { Self { outcomes: Vec::new(), resolution_failed: true } }

  pub fn recipients(&self) -> usize { self.outcomes.len() }

  /// Number of durable notification records written.
  pub fn recorded(&self) -> usize {
    self.outcomes.iter().filter(|o| o.is_recorded()).count()
  }

  pub fn push_attempts(&self) -> usize {
    self.outcomes.iter().filter(|o| o.push_attempted()).count()
  }

  /// Some recipient may be missing their in-app notice. Push-only problems do
  /// not count.
  pub fn is_degraded(&self) -> bool {
    self.resolution_failed || self.outcomes.iter().any(|o| !o.is_recorded())
  }
}

/// Result of [`LifecycleController::submit`].
#[derive(Debug, Clone)]
pub struct Submission {
  pub request: FuelRequest,
  pub fan_out: FanOut,
}

/// Result of [`LifecycleController::decide`].
#[derive(Debug, Clone)]
pub struct Transition {
  pub request_id: RequestId,
  pub previous:   Status,
  pub status:     Status,
  pub fan_out:    FanOut,
}

// ─── Controller ──────────────────────────────────────────────────────────────

pub struct LifecycleController<S, P> {
  store:              Arc<S>,
  dispatcher:         Dispatcher<S, P>,
  fanout_concurrency: usize,
}

impl<S, P> LifecycleController<S, P>
where
  S: FuelStore,
  P: PushTransport,
{
  pub fn new(store: Arc<S>, push: Arc<P>) -> Self {
    Self {
      dispatcher: Dispatcher::new(Arc::clone(&store), push),
      store,
      fanout_concurrency: DEFAULT_FANOUT_CONCURRENCY,
    }
  }

  /// Bound the number of recipients notified in parallel (minimum 1).
  pub fn with_fanout_concurrency(mut self, limit: usize) -> Self {
    self.fanout_concurrency = limit.max(1);
    self
  }

  /// The record store, for read paths that need no lifecycle logic.
  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Create a `Pending` request and notify every manager.
  pub async fn submit(
    &self,
    driver_id: UserId,
    facts: PurchaseFacts,
    receipt: Option<NewReceipt>,
  ) -> Result<Submission> {
    facts.validate()?;
    if let Some(r) = &receipt {
      if r.file_ref.trim().is_empty() {
        return Err(Error::Validation("receipt file reference is empty".into()));
      }
      if r.media_type.trim().is_empty() {
        return Err(Error::Validation("receipt media type is empty".into()));
      }
    }

    self
      .store
      .get_user(driver_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::UserNotFound(driver_id))?;

    let request = self
      .store
      .create(NewFuelRequest { driver_id, facts, receipt })
      .await
      .map_err(Error::storage)?;
    let request_id = request.request_id;
    info!(%request_id, driver = %driver_id, "fuel request submitted");

    let fan_out = match self.store.resolve_for_role(Role::Manager).await {
      Ok(managers) => {
        if managers.is_empty() {
          info!(%request_id, "no managers to notify");
        }
        let message = NotificationMessage::submitted(request_id);
        self.fan_out(managers, &message).await
      }
      Err(err) => {
        error!(
          %request_id,
          error = %err,
          "could not resolve managers; submission not announced"
        );
        FanOut::unresolved()
      }
    };

    Ok(Submission { request, fan_out })
  }

  /// Move a `Pending` request to `decision` and notify its driver.
  ///
  /// Deciding a request that is no longer pending fails with
  /// [`Error::InvalidTransition`] and notifies nobody.
  pub async fn decide(&self, request_id: RequestId, decision: Decision) -> Result<Transition> {
    let next = Status::from(decision);

    let previous = self
      .store
      .update_status(request_id, Status::Pending, next)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::RequestNotFound(request_id))?;

    if previous.is_terminal() {
      warn!(
        %request_id,
        current = %previous,
        requested = %next,
        "decision on a request that is no longer pending; possible double submission"
      );
      return Err(Error::InvalidTransition { request_id, from: previous, to: next });
    }
    info!(%request_id, status = %next, "fuel request decided");

    let fan_out = match self.store.resolve_owner(request_id).await {
      Ok(Some(driver)) => {
        let message = NotificationMessage::decided(request_id, next);
        self.fan_out(vec![driver], &message).await
      }
      Ok(None) => {
        warn!(%request_id, "owning driver no longer exists; decision not announced");
        FanOut::default()
      }
      Err(err) => {
        error!(
          %request_id,
          error = %err,
          "could not resolve driver; decision not announced"
        );
        FanOut::unresolved()
      }
    };

    Ok(Transition { request_id, previous, status: next, fan_out })
  }

  async fn fan_out(&self, recipients: Vec<User>, message: &NotificationMessage) -> FanOut {
    let dispatches: Vec<_> = recipients
      .iter()
      .map(|user| self.dispatcher.notify(user, message))
      .collect();
    let outcomes: Vec<DispatchOutcome> = stream::iter(dispatches)
      .buffer_unordered(self.fanout_concurrency)
      .collect()
      .await;

    let fan_out = FanOut { outcomes, resolution_failed: false };
    if fan_out.recorded() < fan_out.recipients() {
      error!(
        title = %message.title,
        recipients = fan_out.recipients(),
        recorded = fan_out.recorded(),
        "some notifications could not be recorded"
      );
    }
    fan_out
  }
}
