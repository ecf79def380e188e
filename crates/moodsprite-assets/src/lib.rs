//! Asset pipeline for the Moodsprite character service.
//!
//! This crate turns the asset producer's directory of PNG keyframes into
//! an immutable [`CharacterSnapshot`](moodsprite_types::CharacterSnapshot):
//!
//! - [`encoder`] normalizes and encodes a single image into a transport blob.
//! - [`definition`] declares which moods and cues a character has.
//! - [`resolve`] maps a (mood, cue) pair to an image file on disk.
//! - [`builder`] walks the tree and assembles the snapshot.
//!
//! Builds are synchronous and CPU/IO bound. Async callers should run them
//! on a blocking thread.

pub mod builder;
pub mod definition;
pub mod encoder;
pub mod error;
pub mod resolve;

pub use builder::build_character;
pub use definition::{CharacterDefinition, MoodDefinition, SubjectDefinition};
pub use encoder::{decode_blob, encode_file, encode_image};
pub use error::{BuildError, EncodeError};
