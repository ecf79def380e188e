//! Character cache builder.
//!
//! Walks the asset producer's directory layout, resolves every declared
//! (mood, cue) pair to an image file, encodes it and assembles an
//! immutable [`CharacterSnapshot`]. The build is all-or-nothing: the
//! first failure aborts it and nothing partial is ever returned.
//!
//! Expected layout under the asset root:
//!
//! ```text
//! <root>/
//!   neutral.png            (subject image, path configurable)
//!   helpful/               (one directory per mood name)
//!     sera_helpful_variant_01_slightly_smiling.png
//!     ...
//! ```

use std::path::Path;

use moodsprite_types::{
    CharacterSnapshot, CharacterVersion, Keyframe, KeyframeId, Mood, MoodId,
};
use tracing::{debug, info};

use crate::definition::{CharacterDefinition, MoodDefinition};
use crate::encoder;
use crate::error::BuildError;
use crate::resolve::{MoodDirectory, list_png_files};

/// Build a complete character snapshot from the asset tree at `root`.
///
/// Every keyframe and mood receives a freshly generated id, so two builds
/// of the same tree never share identities.
///
/// # Errors
///
/// - [`BuildError::InvalidDefinition`] if `definition` fails validation.
/// - [`BuildError::AssetMissing`] if the subject image, a mood directory,
///   or a cue's image cannot be found, or a mood directory is empty.
/// - [`BuildError::Encode`] if an image cannot be encoded.
/// - [`BuildError::Io`] if a mood directory cannot be listed.
pub fn build_character(
    root: &Path,
    definition: &CharacterDefinition,
) -> Result<CharacterSnapshot, BuildError> {
    definition.validate()?;

    info!(
        root = %root.display(),
        character = definition.name,
        moods = definition.moods.len(),
        "Building character cache"
    );

    let subject_path = root.join(&definition.subject.path);
    if !subject_path.is_file() {
        return Err(BuildError::missing(subject_path, "subject image not found"));
    }
    let subject_image = load_keyframe(&subject_path, &definition.subject.description)?;

    let prefix = definition.file_prefix();
    let moods = definition
        .moods
        .iter()
        .map(|mood| build_mood(root, &prefix, mood))
        .collect::<Result<Vec<_>, _>>()?;

    let character = CharacterVersion {
        name: definition.name.clone(),
        notes: definition.notes.clone(),
        changelog: definition.changelog.clone(),
        subject_image,
        moods,
        recordings: Vec::new(),
    };

    info!(
        version = definition.semantic_version,
        moods = character.moods.len(),
        keyframes = character.keyframe_count(),
        "Character cache built"
    );

    Ok(CharacterSnapshot {
        semantic_version: definition.semantic_version.clone(),
        character,
    })
}

/// Build one mood from its directory.
fn build_mood(root: &Path, prefix: &str, mood: &MoodDefinition) -> Result<Mood, BuildError> {
    let dir = root.join(&mood.name);
    if !dir.is_dir() {
        return Err(BuildError::missing(dir.clone(), "mood directory not found"));
    }

    let io_error = |source| BuildError::Io {
        path: dir.clone(),
        source,
    };
    let has_entries = std::fs::read_dir(&dir)
        .map_err(io_error)?
        .next()
        .is_some();
    if !has_entries {
        return Err(BuildError::missing(dir.clone(), "mood directory is empty"));
    }

    let listing = list_png_files(&dir).map_err(io_error)?;
    let lookup = MoodDirectory {
        dir: &dir,
        prefix,
        mood: &mood.name,
        listing: &listing,
    };

    debug!(mood = mood.name, dir = %dir.display(), "Loading mood keyframes");

    let mut keyframes = Vec::with_capacity(mood.cues.len());
    for (index, cue) in mood.cues.iter().enumerate() {
        let resolved = lookup.resolve(index, cue).ok_or_else(|| {
            BuildError::missing(
                dir.clone(),
                format!("no keyframe image for cue {index} ({cue:?})"),
            )
        })?;
        debug!(
            mood = mood.name,
            cue = cue.as_str(),
            file = %resolved.path.display(),
            rule = %resolved.rule,
            "Resolved keyframe"
        );
        keyframes.push(load_keyframe(&resolved.path, cue)?);
    }

    Ok(Mood {
        id: MoodId::new(),
        description: mood.resolved_description(),
        notes: format!("Generated from {} keyframe descriptions", mood.cues.len()),
        keyframes,
    })
}

/// Encode one image file into a keyframe with a fresh id.
fn load_keyframe(path: &Path, description: &str) -> Result<Keyframe, BuildError> {
    let image_data = encoder::encode_file(path).map_err(|source| BuildError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Keyframe {
        id: KeyframeId::new(),
        description: description.to_owned(),
        image_data,
    })
}
