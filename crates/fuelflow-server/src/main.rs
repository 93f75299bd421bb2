//! fuelflow-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite record store, and serves the JSON API over HTTP.
//!
//! # Seeding users
//!
//! Accounts are owned by an external identity system. For a standalone
//! deployment, create them with:
//!
//! ```
//! cargo run -p fuelflow-server -- add-user --username mia --role Manager
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fuelflow_core::{
  lifecycle::LifecycleController,
  store::UserStore as _,
  user::{NewUser, Role},
};
use fuelflow_push_fcm::FcmClient;
use fuelflow_server::ServerConfig;
use fuelflow_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fuel request lifecycle and notification service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create a user account and print its id.
  AddUser {
    #[arg(long)]
    username: String,
    /// One of Driver, Manager, Finance, Admin.
    #[arg(long)]
    role:     Role,
    #[arg(long)]
    email:    Option<String>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let db_path = server_cfg.database_path();
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  let result = match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(&server_cfg, store.clone()).await,
    Command::AddUser { username, role, email } => {
      add_user(&store, NewUser { username, email, role }).await
    }
  };

  store.close().await.context("failed to close store")?;
  result
}

async fn add_user(store: &SqliteStore, input: NewUser) -> anyhow::Result<()> {
  let user = store
    .add_user(input)
    .await
    .context("failed to create user")?;
  info!(user_id = %user.user_id, username = %user.username, role = %user.role, "user created");
  println!("{}", user.user_id);
  Ok(())
}

async fn serve(server_cfg: &ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let push = FcmClient::new(server_cfg.push.fcm()).context("failed to build push client")?;
  if !push.is_configured() {
    warn!("push.server_key is empty; push delivery is disabled, in-app notifications only");
  }

  let controller = LifecycleController::new(Arc::new(store), Arc::new(push))
    .with_fanout_concurrency(server_cfg.fanout_concurrency);
  let app = fuelflow_server::app(Arc::new(controller));

  let address = server_cfg.address();
  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("shut down");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for ctrl-c; shutting down");
  }
}
