//! Axum router construction for the Moodsprite API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Moodsprite server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /health` -- liveness probe
/// - `GET /ws/session` -- `WebSocket` cue stream (StartSession)
/// - `GET /api/character` -- full snapshot (FullFetch)
/// - `GET /api/history` -- version history (HistoryFetch)
/// - `GET /api/keyframes/{id}` -- single keyframe
/// - `POST /api/operator/reload` -- rebuild from disk
/// - `GET /api/operator/status` -- service status
///
/// CORS allows any origin so the dashboard can be served from elsewhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws/session", get(ws::ws_session))
        // REST API
        .route("/api/character", get(handlers::get_character))
        .route("/api/history", get(handlers::get_history))
        .route("/api/keyframes/{id}", get(handlers::get_keyframe))
        // Operator
        .route("/api/operator/reload", post(operator::reload))
        .route("/api/operator/status", get(operator::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
