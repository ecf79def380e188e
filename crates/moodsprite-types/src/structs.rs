//! Character data model served by the Moodsprite cache.
//!
//! A [`CharacterSnapshot`] is the unit of caching: one semantic version
//! plus one [`CharacterVersion`] holding the neutral subject image and an
//! ordered list of [`Mood`]s, each an ordered list of [`Keyframe`]s.
//! All of these are built once per load pass and are read-only afterward.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::blob::AssetBlob;
use crate::ids::{KeyframeId, MoodId, RecordingId};

// ---------------------------------------------------------------------------
// Keyframe
// ---------------------------------------------------------------------------

/// One cached, encoded still image of the character tied to a textual cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Keyframe {
    /// Identity assigned at load time.
    pub id: KeyframeId,
    /// The cue text that produced the image.
    pub description: String,
    /// Encoded image (gzip over base64 over PNG).
    #[ts(as = "String")]
    pub image_data: AssetBlob,
}

impl Keyframe {
    /// Copy of this keyframe with the image payload removed.
    pub fn without_asset_data(&self) -> Self {
        Self {
            id: self.id,
            description: self.description.clone(),
            image_data: AssetBlob::empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// A named emotional state holding keyframes in playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Mood {
    /// Identity assigned at load time.
    pub id: MoodId,
    /// Free-text description of when this mood applies.
    pub description: String,
    /// Free-text notes.
    pub notes: String,
    /// Keyframes in generation order. Never empty in a built snapshot.
    pub keyframes: Vec<Keyframe>,
}

impl Mood {
    /// Case-insensitive substring match against the mood description.
    pub fn description_contains(&self, needle: &str) -> bool {
        self.description
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    /// Copy of this mood with every keyframe payload removed.
    pub fn without_asset_data(&self) -> Self {
        Self {
            id: self.id,
            description: self.description.clone(),
            notes: self.notes.clone(),
            keyframes: self
                .keyframes
                .iter()
                .map(Keyframe::without_asset_data)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// An opaque recording attached to a character version.
///
/// The service never produces recordings itself; they are carried through
/// serialization unchanged so history responses round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recording {
    /// Recording identity.
    pub id: RecordingId,
    /// Free-text description.
    pub description: String,
    /// Opaque payload.
    #[ts(as = "String")]
    pub data: AssetBlob,
}

// ---------------------------------------------------------------------------
// CharacterVersion
// ---------------------------------------------------------------------------

/// One version of the character: metadata, subject image and moods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterVersion {
    /// Display name of the character.
    pub name: String,
    /// Free-text notes.
    pub notes: String,
    /// Changes relative to the previous version.
    pub changelog: String,
    /// Neutral reference pose.
    pub subject_image: Keyframe,
    /// Moods in declaration order.
    pub moods: Vec<Mood>,
    /// Opaque recordings, usually empty.
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

impl CharacterVersion {
    /// First mood (in sequence order) whose description contains `needle`,
    /// compared case-insensitively.
    pub fn mood_by_description(&self, needle: &str) -> Option<&Mood> {
        self.moods.iter().find(|mood| mood.description_contains(needle))
    }

    /// Find a keyframe by id, including the subject image.
    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        if self.subject_image.id == id {
            return Some(&self.subject_image);
        }
        self.moods
            .iter()
            .flat_map(|mood| mood.keyframes.iter())
            .find(|keyframe| keyframe.id == id)
    }

    /// Total keyframes across all moods, excluding the subject image.
    pub fn keyframe_count(&self) -> usize {
        self.moods.iter().map(|mood| mood.keyframes.len()).sum()
    }

    /// Copy of this version with all image and recording payloads removed.
    pub fn without_asset_data(&self) -> Self {
        Self {
            name: self.name.clone(),
            notes: self.notes.clone(),
            changelog: self.changelog.clone(),
            subject_image: self.subject_image.without_asset_data(),
            moods: self.moods.iter().map(Mood::without_asset_data).collect(),
            recordings: self
                .recordings
                .iter()
                .map(|recording| Recording {
                    id: recording.id,
                    description: recording.description.clone(),
                    data: AssetBlob::empty(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// CharacterSnapshot
// ---------------------------------------------------------------------------

/// The complete, versioned, immutable character served by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterSnapshot {
    /// Semantic version string of this character build.
    pub semantic_version: String,
    /// The character itself.
    pub character: CharacterVersion,
}

// ---------------------------------------------------------------------------
// CharacterHistory
// ---------------------------------------------------------------------------

/// Version history of the character.
///
/// Only the currently cached version is ever present today, but the
/// list may be empty or hold several versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterHistory {
    /// Display name of the current version.
    pub current_name: String,
    /// Semantic version of the current snapshot.
    pub latest_version: String,
    /// Known versions, newest last.
    pub versions: Vec<CharacterVersion>,
}

impl CharacterHistory {
    /// History holding just the snapshot's version.
    ///
    /// When `include_data` is false every asset payload is stripped.
    pub fn from_snapshot(snapshot: &CharacterSnapshot, include_data: bool) -> Self {
        let version = if include_data {
            snapshot.character.clone()
        } else {
            snapshot.character.without_asset_data()
        };
        Self {
            current_name: snapshot.character.name.clone(),
            latest_version: snapshot.semantic_version.clone(),
            versions: vec![version],
        }
    }
}
