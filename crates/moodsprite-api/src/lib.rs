//! HTTP + `WebSocket` API for the Moodsprite character service.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **FullFetch** (`GET /api/character`) returning the whole snapshot
//! - **HistoryFetch** (`GET /api/history`) returning version history
//! - **StartSession** (`GET /ws/session`) streaming timed cues over a
//!   `WebSocket`, one JSON text frame per cue
//! - **Operator endpoints** for rebuilding the cache and inspecting status
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Every request reads the current [`CharacterSnapshot`] from the shared
//! [`CharacterStore`] by cloning an `Arc`, so a reload never blocks or
//! disturbs readers. Each streaming session runs on its own task with a
//! cancellation token derived from the server's shutdown token.
//!
//! [`CharacterSnapshot`]: moodsprite_types::CharacterSnapshot
//! [`CharacterStore`]: moodsprite_core::store::CharacterStore

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{StartupError, spawn_server};
pub use state::AppState;
