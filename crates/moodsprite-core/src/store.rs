//! The character store: the single published snapshot and its loader.
//!
//! # Architecture
//!
//! The store holds at most one [`CharacterSnapshot`] behind an
//! `RwLock<Option<Arc<_>>>`. The lock is only held long enough to clone or
//! swap the `Arc`; builds run entirely outside it. Readers that grabbed
//! the previous snapshot keep it alive until they drop it, so a reload
//! never changes data underneath an in-flight request or session.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use moodsprite_assets::{BuildError, CharacterDefinition, build_character};
use moodsprite_types::{CharacterSnapshot, Keyframe, KeyframeId, Mood};
use tracing::{error, info};

/// Errors from rebuilding the cache.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    /// The build itself failed.
    #[error("character build failed: {0}")]
    Build(#[from] BuildError),

    /// The blocking build task panicked or was cancelled.
    #[error("build worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Holder of the currently published character snapshot.
#[derive(Debug, Default)]
pub struct CharacterStore {
    current: RwLock<Option<Arc<CharacterSnapshot>>>,
    generation: AtomicU64,
}

impl CharacterStore {
    /// An empty store. Every lookup returns `None` until a publish.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with `snapshot` already published.
    pub fn with_snapshot(snapshot: CharacterSnapshot) -> Self {
        let store = Self::new();
        store.publish(snapshot);
        store
    }

    /// The current snapshot, if one has been published.
    pub fn current(&self) -> Option<Arc<CharacterSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: impl Into<Arc<CharacterSnapshot>>) {
        let snapshot = snapshot.into();
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of successful publishes since startup.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// First mood whose description contains `needle`, ignoring case.
    pub fn mood_by_description(&self, needle: &str) -> Option<Mood> {
        self.current()?
            .character
            .mood_by_description(needle)
            .cloned()
    }

    /// The keyframe with `id`, including the subject image.
    pub fn keyframe(&self, id: KeyframeId) -> Option<Keyframe> {
        self.current()?.character.keyframe(id).cloned()
    }
}

/// Rebuilds the store from a fixed asset root and character definition.
#[derive(Debug, Clone)]
pub struct CharacterLoader {
    root: PathBuf,
    definition: Arc<CharacterDefinition>,
}

impl CharacterLoader {
    /// Create a loader for the tree at `root`.
    pub fn new(root: impl Into<PathBuf>, definition: CharacterDefinition) -> Self {
        Self {
            root: root.into(),
            definition: Arc::new(definition),
        }
    }

    /// The asset root this loader builds from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build synchronously and publish on success.
    ///
    /// On failure the error is logged and the store is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`BuildError`] that aborted the build.
    pub fn load_blocking(&self, store: &CharacterStore) -> Result<Arc<CharacterSnapshot>, BuildError> {
        match build_character(&self.root, &self.definition) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                store.publish(Arc::clone(&snapshot));
                info!(
                    root = %self.root.display(),
                    generation = store.generation(),
                    "Character snapshot published"
                );
                Ok(snapshot)
            }
            Err(e) => {
                error!(root = %self.root.display(), error = %e, "Character build failed");
                Err(e)
            }
        }
    }

    /// Build on a blocking worker and publish on success.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::Build`] if the build fails, or
    /// [`ReloadError::Worker`] if the worker task dies.
    pub async fn reload(&self, store: Arc<CharacterStore>) -> Result<Arc<CharacterSnapshot>, ReloadError> {
        let loader = self.clone();
        let snapshot = tokio::task::spawn_blocking(move || loader.load_blocking(&store)).await??;
        Ok(snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{Rgb, RgbImage};
    use moodsprite_assets::MoodDefinition;
    use moodsprite_types::{AssetBlob, CharacterVersion, MoodId};

    use super::*;

    fn keyframe(description: &str) -> Keyframe {
        Keyframe {
            id: KeyframeId::new(),
            description: description.to_owned(),
            image_data: AssetBlob::new(vec![7]),
        }
    }

    fn snapshot(version: &str) -> CharacterSnapshot {
        CharacterSnapshot {
            semantic_version: version.to_owned(),
            character: CharacterVersion {
                name: "Sera".to_owned(),
                notes: String::new(),
                changelog: String::new(),
                subject_image: keyframe("neutral"),
                moods: vec![
                    Mood {
                        id: MoodId::new(),
                        description: "Helpful and warm".to_owned(),
                        notes: String::new(),
                        keyframes: vec![keyframe("smiling")],
                    },
                    Mood {
                        id: MoodId::new(),
                        description: "sad, also helpful when asked".to_owned(),
                        notes: String::new(),
                        keyframes: vec![keyframe("deflated")],
                    },
                ],
                recordings: Vec::new(),
            },
        }
    }

    fn write_tree(root: &Path) -> CharacterDefinition {
        RgbImage::from_pixel(2, 2, Rgb([1, 1, 1]))
            .save(root.join("neutral.png"))
            .unwrap();
        let helpful = root.join("helpful");
        std::fs::create_dir(&helpful).unwrap();
        RgbImage::from_pixel(2, 2, Rgb([200, 100, 0]))
            .save(helpful.join("01.png"))
            .unwrap();
        CharacterDefinition {
            moods: vec![MoodDefinition::new("helpful", "helpful", &["smiling"])],
            ..CharacterDefinition::default()
        }
    }

    #[test]
    fn empty_store_answers_none() {
        let store = CharacterStore::new();
        assert!(store.current().is_none());
        assert!(store.mood_by_description("helpful").is_none());
        assert!(store.keyframe(KeyframeId::new()).is_none());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn mood_lookup_is_case_insensitive_first_match() {
        let store = CharacterStore::with_snapshot(snapshot("1.0.0"));
        let mood = store.mood_by_description("HELPFUL").unwrap();
        assert_eq!(mood.description, "Helpful and warm");
        assert!(store.mood_by_description("grumpy").is_none());
    }

    #[test]
    fn keyframe_lookup_covers_subject_and_moods() {
        let snap = snapshot("1.0.0");
        let subject = snap.character.subject_image.id;
        let in_mood = snap.character.moods.get(1).unwrap().keyframes.first().unwrap().id;
        let store = CharacterStore::with_snapshot(snap);

        assert_eq!(store.keyframe(subject).unwrap().description, "neutral");
        assert_eq!(store.keyframe(in_mood).unwrap().description, "deflated");
    }

    #[test]
    fn readers_keep_old_snapshot_across_publish() {
        let store = CharacterStore::with_snapshot(snapshot("1.0.0"));
        let held = store.current().unwrap();

        store.publish(snapshot("2.0.0"));

        assert_eq!(held.semantic_version, "1.0.0");
        assert_eq!(store.current().unwrap().semantic_version, "2.0.0");
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn failed_load_leaves_store_untouched() {
        let store = CharacterStore::with_snapshot(snapshot("1.0.0"));
        let dir = tempfile::tempdir().unwrap();
        let loader = CharacterLoader::new(dir.path(), CharacterDefinition::default());

        let result = loader.load_blocking(&store);

        assert!(matches!(result, Err(BuildError::AssetMissing { .. })));
        assert_eq!(store.current().unwrap().semantic_version, "1.0.0");
        assert_eq!(store.generation(), 1);
    }

    #[tokio::test]
    async fn reload_publishes_built_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let definition = write_tree(dir.path());
        let store = Arc::new(CharacterStore::new());
        let loader = CharacterLoader::new(dir.path(), definition);

        let published = loader.reload(Arc::clone(&store)).await.unwrap();

        assert_eq!(published.character.moods.len(), 1);
        assert!(Arc::ptr_eq(&published, &store.current().unwrap()));
        assert_eq!(store.generation(), 1);
    }
}
