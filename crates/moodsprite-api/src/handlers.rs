//! REST endpoint handlers for the Moodsprite API.
//!
//! All handlers read from the published snapshot in the shared
//! [`AppState`]. A request that arrives before the first successful build
//! gets a 404 rather than an empty character.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/character` | Full character snapshot (FullFetch) |
//! | `GET` | `/api/history` | Version history (HistoryFetch) |
//! | `GET` | `/api/keyframes/{id}` | Single keyframe by id |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use moodsprite_types::{CharacterHistory, KeyframeId};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/history` endpoint.
#[derive(Debug, Default, serde::Deserialize)]
pub struct HistoryQuery {
    /// Keep image payloads in the response (default `false`).
    pub include_data: Option<bool>,
    /// Only return this semantic version.
    pub version: Option<String>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing what is loaded and the API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.current();
    let (status, name, version, mood_count, keyframe_count) = snapshot.as_deref().map_or_else(
        || ("NOT LOADED", String::from("-"), String::from("-"), 0, 0),
        |s| {
            (
                "READY",
                s.character.name.clone(),
                s.semantic_version.clone(),
                s.character.moods.len(),
                s.character.keyframe_count(),
            )
        },
    );
    let sessions = state.active_sessions();
    let generation = state.store.generation();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Moodsprite</title>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #222; }}
        table {{ border-collapse: collapse; }}
        th, td {{ text-align: left; padding: 0.2rem 1.2rem 0.2rem 0; }}
        th {{ font-weight: normal; color: #666; }}
        code {{ background: #f3f3f3; padding: 0 0.2rem; }}
    </style>
</head>
<body>
    <h1>Moodsprite</h1>
    <table>
        <tr><th>Status</th><td>{status}</td></tr>
        <tr><th>Character</th><td>{name} {version}</td></tr>
        <tr><th>Moods / keyframes</th><td>{mood_count} / {keyframe_count}</td></tr>
        <tr><th>Active sessions</th><td>{sessions}</td></tr>
        <tr><th>Generation</th><td>{generation}</td></tr>
    </table>
    <h2>Endpoints</h2>
    <p>
        <code>GET <a href="/api/character">/api/character</a></code>
        <code>GET <a href="/api/history">/api/history</a></code>
        <code>GET /api/keyframes/{{id}}</code>
        <code>GET /ws/session</code>
        <code>GET <a href="/api/operator/status">/api/operator/status</a></code>
        <code>POST /api/operator/reload</code>
    </p>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe. Succeeds whether or not a character is loaded.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/character
// ---------------------------------------------------------------------------

/// Return the complete current snapshot, image payloads included.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] until the first successful build.
pub async fn get_character(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let snapshot = state.store.current().ok_or_else(ApiError::no_snapshot)?;
    json_response(snapshot.as_ref())
}

// ---------------------------------------------------------------------------
// GET /api/history
// ---------------------------------------------------------------------------

/// Return the character's version history.
///
/// Image payloads are stripped unless `include_data=true`. With
/// `version=<v>` only that version is returned.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] if nothing is loaded or the requested
/// version is not known.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let snapshot = state.store.current().ok_or_else(ApiError::no_snapshot)?;

    if let Some(version) = query.version.as_deref() {
        if version != snapshot.semantic_version {
            return Err(ApiError::NotFound(format!("version {version}")));
        }
    }

    let history = CharacterHistory::from_snapshot(&snapshot, query.include_data.unwrap_or(false));
    json_response(&history)
}

// ---------------------------------------------------------------------------
// GET /api/keyframes/{id}
// ---------------------------------------------------------------------------

/// Return a single keyframe, including the subject image.
///
/// # Errors
///
/// Returns [`ApiError::InvalidUuid`] for a malformed id, or
/// [`ApiError::NotFound`] if no keyframe has that id.
pub async fn get_keyframe(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Response, ApiError> {
    let id = KeyframeId::from(parse_uuid(&id_str)?);
    let keyframe = state
        .store
        .keyframe(id)
        .ok_or_else(|| ApiError::NotFound(format!("keyframe {id}")))?;
    json_response(&keyframe)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serialize a borrowed value into a JSON response.
fn json_response<T: Serialize + ?Sized>(value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Parse a UUID from a string, returning an [`ApiError`] on failure.
fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}
