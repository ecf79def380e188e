//! Error types for the `moodsprite-assets` crate.
//!
//! [`EncodeError`] covers a single image failing to normalize or
//! serialize. [`BuildError`] covers a whole cache build; any variant
//! aborts the build and leaves the previously published snapshot alone.

use std::path::PathBuf;

/// Errors from turning an image into a transport blob (or back).
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The image could not be decoded or re-serialized.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Compression or decompression failed.
    #[error("compression error: {0}")]
    Io(#[from] std::io::Error),

    /// The text-safe layer of a blob was not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors that abort a character cache build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A required file or directory is absent.
    #[error("asset missing at {}: {reason}", path.display())]
    AssetMissing {
        /// The file or directory that was expected.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A resolved image could not be encoded.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// The source image file.
        path: PathBuf,
        /// The underlying encoder error.
        #[source]
        source: EncodeError,
    },

    /// A directory could not be listed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The directory being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The character definition itself is unusable.
    #[error("invalid character definition: {0}")]
    InvalidDefinition(String),
}

impl BuildError {
    /// Shorthand for [`BuildError::AssetMissing`].
    pub fn missing(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::AssetMissing {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
