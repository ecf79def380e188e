//! Keyframe image encoder.
//!
//! Turns a raster image into the opaque blob stored in the cache:
//!
//! 1. normalize to 8-bit RGB,
//! 2. serialize losslessly as PNG,
//! 3. base64-encode the PNG bytes,
//! 4. gzip the base64 text.
//!
//! Compression runs over the base64 text, not the raw PNG. Clients undo
//! the layers in reverse order; [`decode_blob`] does exactly that.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use moodsprite_types::AssetBlob;

use crate::error::EncodeError;

/// Encode a decoded image into a transport blob.
///
/// # Errors
///
/// Returns [`EncodeError::Image`] if PNG serialization fails, or
/// [`EncodeError::Io`] if compression fails.
pub fn encode_image(image: &DynamicImage) -> Result<AssetBlob, EncodeError> {
    let rgb = normalize(image);

    let mut png = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    let text = STANDARD.encode(&png);

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(text.as_bytes())?;
    let compressed = gz.finish()?;

    Ok(AssetBlob::new(compressed))
}

/// Open an image file and encode it.
///
/// # Errors
///
/// Returns [`EncodeError::Image`] if the file cannot be read or decoded,
/// plus anything [`encode_image`] returns.
pub fn encode_file(path: &Path) -> Result<AssetBlob, EncodeError> {
    let image = image::open(path)?;
    encode_image(&image)
}

/// Reverse [`encode_image`]: gunzip, base64-decode, then decode the PNG.
///
/// # Errors
///
/// Returns an [`EncodeError`] describing whichever layer was malformed.
pub fn decode_blob(blob: &AssetBlob) -> Result<RgbImage, EncodeError> {
    let mut text = Vec::new();
    GzDecoder::new(blob.as_bytes()).read_to_end(&mut text)?;

    let png = STANDARD.decode(&text)?;
    let image = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
    Ok(image.to_rgb8())
}

/// Force an image into the 3-channel 8-bit color model.
pub fn normalize(image: &DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb.clone(),
        other => other.to_rgb8(),
    }
}
