//! Notification dispatch: one durable record plus one best-effort push per
//! recipient.
//!
//! Both steps are always attempted. Only a failed durable write counts as a
//! failed dispatch; push problems are logged and surface as a degraded
//! [`PushOutcome`], never as an error.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
  notification::{NewNotification, Notification, NotificationMessage},
  push::PushTransport,
  store::NotificationStore,
  user::{User, UserId},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of the durable write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
  Written(Notification),
  Failed(String),
}

/// Result of the push attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
  Sent,
  /// The recipient has no token; no attempt was made.
  NoToken,
  Failed(String),
}

/// What happened when notifying one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
  pub recipient: UserId,
  pub record:    RecordOutcome,
  pub push:      PushOutcome,
}

impl DispatchOutcome {
  /// `false` only when the durable write failed.
  pub fn is_recorded(&self) -> bool {
    matches!(self.record, RecordOutcome::Written(_))
  }

  pub fn notification(&self) -> Option<&Notification> {
    match &self.record {
      RecordOutcome::Written(n) => Some(n),
      RecordOutcome::Failed(_) => None,
    }
  }

  pub fn push_attempted(&self) -> bool { !matches!(self.push, PushOutcome::NoToken) }

  /// The record exists but the push did not go out.
  pub fn is_degraded(&self) -> bool {
    self.is_recorded() && !matches!(self.push, PushOutcome::Sent)
  }
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

pub struct Dispatcher<N, P> {
  notifications: Arc<N>,
  push:          Arc<P>,
}

impl<N, P> Clone for Dispatcher<N, P> {
  fn clone(&self) -> Self {
    Self {
      notifications: Arc::clone(&self.notifications),
      push:          Arc::clone(&self.push),
    }
  }
}

impl<N, P> Dispatcher<N, P>
where
  N: NotificationStore,
  P: PushTransport,
{
  pub fn new(notifications: Arc<N>, push: Arc<P>) -> Self {
    Self { notifications, push }
  }

  /// Record `message` for `recipient`, then try to push it.
  pub async fn notify(
    &self,
    recipient: &User,
    message: &NotificationMessage,
  ) -> DispatchOutcome {
    let input = NewNotification {
      recipient: recipient.user_id,
      title:     message.title.clone(),
      message:   message.body.clone(),
    };

    let record = match self.notifications.record(input).await {
      Ok(notification) => RecordOutcome::Written(notification),
      Err(err) => {
        error!(
          recipient = %recipient.user_id,
          title = %message.title,
          error = %err,
          "failed to record notification"
        );
        RecordOutcome::Failed(err.to_string())
      }
    };

    let push = match recipient.push_token() {
      None => {
        debug!(recipient = %recipient.user_id, "no push token; skipping push");
        PushOutcome::NoToken
      }
      Some(token) => match self.push.send(token, message).await {
        Ok(()) => PushOutcome::Sent,
        Err(err) => {
          warn!(
            recipient = %recipient.user_id,
            title = %message.title,
            error = %err,
            "push delivery failed"
          );
          PushOutcome::Failed(err.to_string())
        }
      },
    };

    DispatchOutcome { recipient: recipient.user_id, record, push }
  }
}
