//! Opaque encoded asset bytes.
//!
//! An [`AssetBlob`] holds the transport form of a keyframe image as
//! produced by the asset encoder. On the JSON wire it is a standard
//! base64 string, the same shape a protobuf `bytes` field takes in its
//! JSON mapping.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Encoded asset payload. Never inspected by the serving path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AssetBlob(Vec<u8>);

impl AssetBlob {
    /// Wrap already-encoded bytes.
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// An empty blob, used where asset data has been stripped.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Borrow the raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the blob and return the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of encoded bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the blob carries no data.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for AssetBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for AssetBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for AssetBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}
