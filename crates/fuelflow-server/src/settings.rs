//! Runtime configuration, read from `config.toml` and `FUELFLOW_*`
//! environment variables.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `FUELFLOW_PUSH__SERVER_KEY` sets `push.server_key`. Environment values win
//! over the file.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{Environment, File, Source};
use fuelflow_core::lifecycle::DEFAULT_FANOUT_CONCURRENCY;
use fuelflow_push_fcm::{DEFAULT_ENDPOINT, FcmConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("failed to read configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

pub type Result<T, E = SettingsError> = std::result::Result<T, E>;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  /// SQLite file; `~/` is expanded and `:memory:` is accepted.
  #[serde(default = "default_database_path")]
  pub database_path:      PathBuf,
  #[serde(default)]
  pub push:               PushConfig,
  #[serde(default = "default_fanout_concurrency")]
  pub fanout_concurrency: usize,
}

#[derive(Deserialize, Clone)]
pub struct PushConfig {
  /// Empty disables push delivery; in-app notifications are still written.
  #[serde(default)]
  pub server_key:   String,
  #[serde(default = "default_endpoint")]
  pub endpoint:     String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl std::fmt::Debug for PushConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PushConfig")
      .field("server_key", &if self.server_key.is_empty() { "" } else { "[REDACTED]" })
      .field("endpoint", &self.endpoint)
      .field("timeout_secs", &self.timeout_secs)
      .finish()
  }
}

impl Default for PushConfig {
  fn default() -> Self {
    Self {
      server_key:   String::new(),
      endpoint:     default_endpoint(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }
fn default_database_path() -> PathBuf { PathBuf::from("fuelflow.db") }
fn default_fanout_concurrency() -> usize { DEFAULT_FANOUT_CONCURRENCY }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.into() }
fn default_timeout_secs() -> u64 { 10 }

impl ServerConfig {
  /// Layer the (optional) TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self> {
    Self::from_sources(File::from(path).required(false), environment())
  }

  fn from_sources<F>(file: F, env: Environment) -> Result<Self>
  where
    F: Source + Send + Sync + 'static,
  {
    let cfg: Self = config::Config::builder()
      .add_source(file)
      .add_source(env)
      .build()?
      .try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> Result<()> {
    if self.fanout_concurrency == 0 {
      return Err(SettingsError::Invalid("fanout_concurrency must be at least 1".into()));
    }
    if self.push.timeout_secs == 0 {
      return Err(SettingsError::Invalid("push.timeout_secs must be at least 1".into()));
    }
    if self.host.trim().is_empty() {
      return Err(SettingsError::Invalid("host must not be empty".into()));
    }
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The database path with a leading `~/` expanded.
  pub fn database_path(&self) -> PathBuf { expand_tilde(&self.database_path) }
}

impl PushConfig {
  pub fn fcm(&self) -> FcmConfig {
    FcmConfig {
      endpoint:   self.endpoint.clone(),
      server_key: self.server_key.clone(),
      timeout:    Duration::from_secs(self.timeout_secs),
    }
  }
}

fn environment() -> Environment {
  Environment::with_prefix("FUELFLOW")
    .prefix_separator("_")
    .separator("__")
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
