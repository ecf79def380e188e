//! Server startup helper for the service binary.
//!
//! Provides [`spawn_server`] which binds the listener eagerly and then
//! runs the HTTP + `WebSocket` server on a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use moodsprite_api::startup::spawn_server;
//! use moodsprite_api::state::AppState;
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(store));
//! let handle = spawn_server(&config.server, Arc::clone(&state)).await?;
//! state.shutdown.cancel();
//! handle.await?;
//! ```

use std::sync::Arc;

use moodsprite_core::config::ServerConfig;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the configured address and spawn the server on a background task.
///
/// The bind happens before spawning, so an unusable address is reported
/// to the caller instead of being logged from inside the task. The server
/// runs until `state.shutdown` is cancelled; await the returned handle to
/// wait for in-flight connections to drain.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot bind.
pub async fn spawn_server(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Moodsprite server exited with error");
        }
    });

    tracing::info!(port = config.port, "Moodsprite server spawned on background task");

    Ok(handle)
}
