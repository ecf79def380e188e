//! Operator REST API handlers for runtime service management.
//!
//! These endpoints sit beside the client-facing API and let an operator
//! rebuild the character cache from disk and inspect what is being served.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/reload` | Rebuild the cache from the asset root |
//! | `GET` | `/api/operator/status` | Current service status |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use moodsprite_core::store::ReloadError;
use moodsprite_types::CharacterVersion;
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Response body for a successful reload.
#[derive(Debug, serde::Serialize)]
pub struct ReloadResponse {
    /// Always `true`; failures use the error body instead.
    pub ok: bool,
    /// Semantic version of the freshly published snapshot.
    pub semantic_version: String,
    /// Number of moods built.
    pub moods: usize,
    /// Number of mood keyframes built (subject excluded).
    pub keyframes: usize,
    /// Store generation after publishing.
    pub generation: u64,
}

/// Response body for `GET /api/operator/status`.
#[derive(Debug, serde::Serialize)]
pub struct ServiceStatus {
    /// Whether a snapshot is published.
    pub loaded: bool,
    /// Character name, if loaded.
    pub character: Option<String>,
    /// Semantic version, if loaded.
    pub semantic_version: Option<String>,
    /// Number of moods in the snapshot.
    pub moods: usize,
    /// Number of mood keyframes in the snapshot.
    pub keyframes: usize,
    /// Number of successful publishes since startup.
    pub generation: u64,
    /// Sessions currently streaming.
    pub active_sessions: usize,
    /// Asset root the reload endpoint builds from, if one is attached.
    pub asset_root: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /api/operator/reload
// ---------------------------------------------------------------------------

/// Rebuild the character cache from the configured asset root.
///
/// The previous snapshot keeps serving until the new one is published. On
/// failure the detailed error is logged and the client gets a generic 500.
pub async fn reload(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let loader = state
        .loader
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("no asset loader configured".to_owned()))?;

    info!(root = %loader.root().display(), "Operator requested reload");

    let snapshot = match loader.reload(Arc::clone(&state.store)).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // Build failures were already logged with their path by the loader.
            if let ReloadError::Worker(join) = &e {
                error!(error = %join, "Reload worker failed");
            }
            return Err(ApiError::Internal("character reload failed".to_owned()));
        }
    };

    Ok(Json(ReloadResponse {
        ok: true,
        semantic_version: snapshot.semantic_version.clone(),
        moods: snapshot.character.moods.len(),
        keyframes: snapshot.character.keyframe_count(),
        generation: state.store.generation(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/operator/status
// ---------------------------------------------------------------------------

/// Report what the service is currently serving.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.current();
    let character = snapshot.as_deref().map(|s| &s.character);

    Json(ServiceStatus {
        loaded: snapshot.is_some(),
        character: character.map(|c| c.name.clone()),
        semantic_version: snapshot.as_deref().map(|s| s.semantic_version.clone()),
        moods: character.map_or(0, |c| c.moods.len()),
        keyframes: character.map_or(0, CharacterVersion::keyframe_count),
        generation: state.store.generation(),
        active_sessions: state.active_sessions(),
        asset_root: state
            .loader
            .as_ref()
            .map(|l| l.root().display().to_string()),
    })
}
