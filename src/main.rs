//! Swipe-categorize interaction backend
//!
//! - Axum HTTP + WebSocket API over in-memory learner sessions
//! - Exercise bank from TOML plus built-in seed exercises
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   EXERCISE_CONFIG_PATH : path to TOML exercise bank
//!   SESSION_IDLE_SECS    : idle sessions older than this are evicted (default 1800)
//!   MAX_SESSIONS         : session store cap, least recently used evicted (default 10000)
//!   SESSION_SWEEP_SECS   : idle sweep period (default 60)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod config;
mod seeds;
mod scoring;
mod ordering;
mod interaction;
mod persisted;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::{spawn_session_sweeper, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Exercise catalogue + empty session store.
  let state = Arc::new(AppState::new());
  let sweeper = spawn_session_sweeper(state.clone());

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "swipe_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  sweeper.abort();
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "swipe_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "swipe_backend", "Shutdown signal received");
}
