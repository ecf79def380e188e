//! Shared type definitions for the Moodsprite character service.
//!
//! This crate is the single source of truth for everything that crosses
//! the wire: the cached character model, live cues and history records.
//! Types flow downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for keyframes, moods, sessions
//! - [`blob`] -- Opaque encoded asset bytes (base64 on the JSON wire)
//! - [`structs`] -- Keyframe, mood, character version, snapshot, history
//! - [`cue`] -- Live cue events emitted by streaming sessions

pub mod blob;
pub mod cue;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use blob::AssetBlob;
pub use cue::Cue;
pub use ids::{KeyframeId, MoodId, RecordingId, SessionId};
pub use structs::{
    CharacterHistory, CharacterSnapshot, CharacterVersion, Keyframe, Mood, Recording,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the wire types.

    #[test]
    fn export_bindings() {
        // Files are written to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        let _ = crate::ids::KeyframeId::export_all();
        let _ = crate::ids::MoodId::export_all();
        let _ = crate::ids::RecordingId::export_all();
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::structs::Keyframe::export_all();
        let _ = crate::structs::Mood::export_all();
        let _ = crate::structs::Recording::export_all();
        let _ = crate::structs::CharacterVersion::export_all();
        let _ = crate::structs::CharacterSnapshot::export_all();
        let _ = crate::structs::CharacterHistory::export_all();
        let _ = crate::cue::Cue::export_all();
    }
}
