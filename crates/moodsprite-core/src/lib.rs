//! Configuration, character store, and cue streaming for the Moodsprite service.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `moodsprite-config.yaml` into
//!   strongly-typed structs.
//! - [`store`] -- The published [`CharacterSnapshot`] and the loader that
//!   rebuilds it from the asset tree.
//! - [`session`] -- The per-client cue streaming state machine.
//!
//! [`CharacterSnapshot`]: moodsprite_types::CharacterSnapshot

pub mod config;
pub mod session;
pub mod store;
