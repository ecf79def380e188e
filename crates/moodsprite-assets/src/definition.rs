//! Character definition: which moods exist and which cues each declares.
//!
//! The definition is a configuration value passed into the builder, not
//! a global constant. [`CharacterDefinition::default`] is the canonical
//! Sera character; tests and alternate deployments supply their own via
//! the `character:` section of the service config.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Complete description of the character to load from the asset tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDefinition {
    /// Display name; its lowercase form prefixes generated file names.
    #[serde(default = "default_name")]
    pub name: String,

    /// Free-text notes carried into the character version.
    #[serde(default = "default_notes")]
    pub notes: String,

    /// Changelog carried into the character version.
    #[serde(default = "default_changelog")]
    pub changelog: String,

    /// Semantic version of the snapshot built from this definition.
    #[serde(default = "default_semantic_version")]
    pub semantic_version: String,

    /// The neutral subject image.
    #[serde(default)]
    pub subject: SubjectDefinition,

    /// Moods in playback-relevant order.
    #[serde(default = "default_moods")]
    pub moods: Vec<MoodDefinition>,
}

impl Default for CharacterDefinition {
    fn default() -> Self {
        Self {
            name: default_name(),
            notes: default_notes(),
            changelog: default_changelog(),
            semantic_version: default_semantic_version(),
            subject: SubjectDefinition::default(),
            moods: default_moods(),
        }
    }
}

impl CharacterDefinition {
    /// Prefix the asset producer puts in front of generated file names.
    pub fn file_prefix(&self) -> String {
        self.name.to_lowercase()
    }

    /// Check the definition before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidDefinition`] if there are no moods, a
    /// mood name is empty, duplicated or not a plain directory name, or a
    /// mood declares no cues.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.moods.is_empty() {
            return Err(BuildError::InvalidDefinition(
                "at least one mood is required".to_owned(),
            ));
        }

        let mut seen = BTreeSet::new();
        for mood in &self.moods {
            let name = mood.name.as_str();
            if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
                return Err(BuildError::InvalidDefinition(format!(
                    "mood name {name:?} is not a plain directory name"
                )));
            }
            if !seen.insert(name) {
                return Err(BuildError::InvalidDefinition(format!(
                    "mood {name:?} is declared twice"
                )));
            }
            if mood.cues.is_empty() {
                return Err(BuildError::InvalidDefinition(format!(
                    "mood {name:?} declares no cues"
                )));
            }
        }
        Ok(())
    }
}

/// Location and caption of the neutral reference image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDefinition {
    /// Path relative to the asset root.
    #[serde(default = "default_subject_path")]
    pub path: PathBuf,

    /// Description stored on the subject keyframe.
    #[serde(default = "default_subject_description")]
    pub description: String,
}

impl Default for SubjectDefinition {
    fn default() -> Self {
        Self {
            path: default_subject_path(),
            description: default_subject_description(),
        }
    }
}

/// One mood: its directory name, description and ordered cues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodDefinition {
    /// Mood name, also the subdirectory holding its images.
    pub name: String,

    /// Description; when absent, `"<name> mood state"` is used.
    #[serde(default)]
    pub description: Option<String>,

    /// Cue texts in generation order, one keyframe each.
    pub cues: Vec<String>,
}

impl MoodDefinition {
    /// Build a mood definition from string slices.
    pub fn new(name: &str, description: &str, cues: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            description: Some(description.to_owned()),
            cues: cues.iter().map(|&cue| cue.to_owned()).collect(),
        }
    }

    /// The description stored on the built mood.
    pub fn resolved_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("{} mood state", self.name))
    }
}

// ---------------------------------------------------------------------------
// Defaults: the Sera character
// ---------------------------------------------------------------------------

fn default_name() -> String {
    "Sera".to_owned()
}

fn default_notes() -> String {
    "SLR-9 'Soft Liaison, Reflective' model - Experimental empathic interface android".to_owned()
}

fn default_changelog() -> String {
    "Initial version with basic mood keyframes".to_owned()
}

fn default_semantic_version() -> String {
    "1.0.0".to_owned()
}

fn default_subject_path() -> PathBuf {
    PathBuf::from("neutral.png")
}

fn default_subject_description() -> String {
    "neutral reference image".to_owned()
}

fn default_moods() -> Vec<MoodDefinition> {
    vec![
        MoodDefinition::new(
            "helpful",
            "helpful, open, having newly met the user and coming in with warmth and positive expectations",
            &[
                "slightly smiling",
                "smiling",
                "smiling broadly",
                "waving hello, hand to the left",
                "waving hello, hand to the right",
            ],
        ),
        MoodDefinition::new(
            "skeptical",
            "skeptical, polite, reserved - when the user shows ill intent or is trying to sell something",
            &[
                "slightly smiling with a distant look in the eyes",
                "frowning slightly",
                "looking away with a slightly furrowed brow",
                "looking directly at the camera with a slightly furrowed brow and a look of concern",
            ],
        ),
        MoodDefinition::new(
            "sad",
            "sad and deflated - when the user shows toxicity or insults Sera directly",
            &[
                "looking deflated",
                "looking about to cry",
                "looking dejectedly at the camera",
            ],
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_definition_is_sera() {
        let def = CharacterDefinition::default();
        assert_eq!(def.name, "Sera");
        assert_eq!(def.file_prefix(), "sera");
        assert_eq!(def.semantic_version, "1.0.0");
        let names: Vec<&str> = def.moods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["helpful", "skeptical", "sad"]);
        assert_eq!(def.moods.iter().map(|m| m.cues.len()).sum::<usize>(), 12);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn missing_description_falls_back_to_name() {
        let mood = MoodDefinition {
            name: "curious".to_owned(),
            description: None,
            cues: vec!["tilting head".to_owned()],
        };
        assert_eq!(mood.resolved_description(), "curious mood state");
    }

    #[test]
    fn parses_from_yaml_with_defaults() {
        let yaml = r#"
name: "Pip"
moods:
  - name: happy
    cues: ["grinning", "laughing"]
"#;
        let def: CharacterDefinition = serde_yml::from_str(yaml).unwrap();
        assert_eq!(def.name, "Pip");
        assert_eq!(def.subject.path, PathBuf::from("neutral.png"));
        assert_eq!(def.moods.len(), 1);
        assert_eq!(def.moods.first().map(|m| m.cues.len()), Some(2));
    }

    #[test]
    fn rejects_empty_and_duplicate_moods() {
        let mut def = CharacterDefinition::default();
        def.moods.clear();
        assert!(matches!(def.validate(), Err(BuildError::InvalidDefinition(_))));

        let mut def = CharacterDefinition::default();
        def.moods.push(MoodDefinition::new("sad", "again", &["x"]));
        assert!(matches!(def.validate(), Err(BuildError::InvalidDefinition(_))));

        let mut def = CharacterDefinition::default();
        def.moods.push(MoodDefinition::new("bored", "no cues", &[]));
        assert!(matches!(def.validate(), Err(BuildError::InvalidDefinition(_))));

        let mut def = CharacterDefinition::default();
        def.moods.push(MoodDefinition::new("../escape", "bad", &["x"]));
        assert!(matches!(def.validate(), Err(BuildError::InvalidDefinition(_))));
    }
}
