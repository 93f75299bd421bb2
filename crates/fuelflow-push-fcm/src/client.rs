//! [`FcmClient`], the reqwest-backed push transport.

use std::{fmt, time::Duration};

use fuelflow_core::{
  notification::NotificationMessage,
  push::{PushError, PushTransport},
};
use reqwest::{Client, Url, header};
use tracing::debug;

use crate::{Error, Result, wire};

/// The FCM legacy send endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Connection settings for [`FcmClient`].
#[derive(Debug, Clone)]
pub struct FcmConfig {
  pub endpoint:   String,
  /// Empty means "not configured": every send fails with `NotConfigured`.
  pub server_key: String,
  pub timeout:    Duration,
}

impl Default for FcmConfig {
  fn default() -> Self {
    Self {
      endpoint:   DEFAULT_ENDPOINT.to_owned(),
      server_key: String::new(),
      timeout:    Duration::from_secs(10),
    }
  }
}

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct FcmClient {
  http:       Client,
  endpoint:   Url,
  server_key: String,
}

impl fmt::Debug for FcmClient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FcmClient")
      .field("endpoint", &self.endpoint.as_str())
      .field("configured", &self.is_configured())
      .finish_non_exhaustive()
  }
}

impl FcmClient {
  pub fn new(config: FcmConfig) -> Result<Self> {
    let endpoint = Url::parse(&config.endpoint).map_err(|e| Error::InvalidEndpoint {
      endpoint: config.endpoint.clone(),
      reason:   e.to_string(),
    })?;
    let http = Client::builder()
      .user_agent(concat!("fuelflow/", env!("CARGO_PKG_VERSION")))
      .timeout(config.timeout)
      .build()?;
    Ok(Self { http, endpoint, server_key: config.server_key.trim().to_owned() })
  }

  pub fn is_configured(&self) -> bool { !self.server_key.is_empty() }

  /// The HTTP request for one delivery attempt.
  pub fn build_request(
    &self,
    token: &str,
    message: &NotificationMessage,
  ) -> Result<reqwest::Request, PushError> {
    self
      .http
      .post(self.endpoint.clone())
      .header(header::AUTHORIZATION, format!("key={}", self.server_key))
      .header(header::CONTENT_TYPE, "application/json")
      .json(&wire::SendBody::new(token, message))
      .build()
      .map_err(|e| PushError::Transport(e.to_string()))
  }
}

impl PushTransport for FcmClient {
  async fn send(&self, token: &str, message: &NotificationMessage) -> Result<(), PushError> {
    if !self.is_configured() {
      return Err(PushError::NotConfigured);
    }

    let request = self.build_request(token, message)?;
    let response = self
      .http
      .execute(request)
      .await
      .map_err(|e| PushError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| PushError::Transport(e.to_string()))?;
    debug!(%status, title = %message.title, "push attempt answered");

    wire::interpret(status, &body)
  }
}
