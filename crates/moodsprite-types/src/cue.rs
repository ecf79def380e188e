//! Live cue events emitted during a streaming session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::KeyframeId;

/// A single timed event telling the client which keyframe to show.
///
/// Cues are ephemeral: created per streaming tick and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cue {
    /// Wall-clock emission time.
    pub timestamp: DateTime<Utc>,
    /// How long the cue stays valid, in milliseconds.
    pub duration_valid_ms: u32,
    /// Keyframe to display. Always present in the snapshot the session
    /// started from.
    pub keyframe_id: KeyframeId,
    /// Human-readable explanation of the cue.
    pub explanation: String,
    /// Optional alternate text for the cue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_cue_text: Option<String>,
}
