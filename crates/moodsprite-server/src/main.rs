//! Moodsprite service binary.
//!
//! Wires together configuration, the character store and the HTTP +
//! `WebSocket` API, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `moodsprite-config.yaml` (or `MOODSPRITE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the character cache from the asset root
//! 4. Start the API server
//! 5. Wait for `Ctrl-C`, cancel every session, drain the server

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use moodsprite_api::state::AppState;
use moodsprite_core::config::{self, ServiceConfig};
use moodsprite_core::session::SessionConfig;
use moodsprite_core::store::{CharacterLoader, CharacterStore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServiceError;

/// Application entry point for the Moodsprite service.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the listener
/// cannot bind, or the shutdown signal cannot be awaited.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so what happened is
    //    reported once it is.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("moodsprite-server starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        character = config.character.name,
        asset_root = %config.assets.root.display(),
        tick_interval_ms = config.session.tick_interval_ms,
        entry_mood = config.session.entry_mood_keyword,
        "Service configuration"
    );

    // 3. Build the character cache. A failure leaves the store empty and
    //    every fetch answers 404 until an operator reload succeeds.
    let store = Arc::new(CharacterStore::new());
    let loader = CharacterLoader::new(config.assets.root.clone(), config.character.clone());
    match loader.reload(Arc::clone(&store)).await {
        Ok(snapshot) => info!(
            version = snapshot.semantic_version,
            moods = snapshot.character.moods.len(),
            keyframes = snapshot.character.keyframe_count(),
            "Character cache ready"
        ),
        Err(e) => warn!(error = %e, "Starting without a character snapshot"),
    }

    // 4. Start the API server.
    let shutdown = CancellationToken::new();
    let state = Arc::new(
        AppState::new(store)
            .with_loader(loader)
            .with_session(SessionConfig::from(&config.session))
            .with_shutdown(shutdown.clone()),
    );
    let server = moodsprite_api::spawn_server(&config.server, state)
        .await
        .map_err(ServiceError::from)?;
    info!(port = config.server.port, "Moodsprite API server started");

    // 5. Serve until interrupted.
    tokio::signal::ctrl_c().await.map_err(ServiceError::from)?;
    info!("Shutdown requested, cancelling sessions");
    shutdown.cancel();
    server.await.map_err(ServiceError::from)?;

    info!("moodsprite-server stopped");
    Ok(())
}

/// Load configuration, returning the file it came from.
///
/// `MOODSPRITE_CONFIG` names the file explicitly and must exist. Otherwise
/// `moodsprite-config.yaml` in the working directory is used if present,
/// and built-in defaults if not. Environment overrides apply either way.
fn load_config() -> Result<(ServiceConfig, Option<PathBuf>), ServiceError> {
    if let Ok(path) = std::env::var(config::CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        let config = ServiceConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = PathBuf::from(config::DEFAULT_CONFIG_FILE);
    if path.exists() {
        let config = ServiceConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = ServiceConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok((config, None))
    }
}
