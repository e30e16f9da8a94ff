//! PNG encoding for captured rasters
//!
//! Captures leave the pipeline as 8-bit RGB PNG. Channels are clamped to
//! 0.0..=1.0 on the way out regardless of what the effect chain produced.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use sha2::{Digest, Sha256};

use crate::error::{CaptureError, Result};
use crate::raster::buffer::{PixelBuffer, Rgb};

/// A finished capture ready for a sink
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// PNG file contents
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Logical capture tag (e.g. `RED_COLOUR`) sinks may use for naming
    pub tag: String,
    /// Hex SHA-256 of `bytes`
    pub checksum: String,
}

impl EncodedImage {
    /// Size of the encoded file in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode a buffer as an 8-bit RGB PNG
///
/// # Arguments
/// * `buffer` - Raster to encode; out-of-range channels are clamped
/// * `tag` - Capture tag carried alongside the bytes
///
/// # Errors
/// `Encode` if the PNG encoder rejects the data
pub fn encode_png(buffer: &PixelBuffer, tag: &str) -> Result<EncodedImage> {
    if !buffer.is_finite() {
        return Err(CaptureError::Encode {
            reason: "buffer contains NaN or infinite samples".to_string(),
            source: None,
        });
    }

    let raw = buffer.to_rgb8();
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&raw, buffer.width(), buffer.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::Encode {
            reason: format!("PNG encoder failed: {}", e),
            source: Some(Box::new(e)),
        })?;

    let checksum = checksum(&bytes);
    Ok(EncodedImage {
        bytes,
        width: buffer.width(),
        height: buffer.height(),
        tag: tag.to_string(),
        checksum,
    })
}

/// Decode PNG bytes back into a pixel buffer
///
/// Used by tooling that inspects finished captures.
pub fn decode_png(bytes: &[u8]) -> Result<PixelBuffer> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|e| {
        CaptureError::Encode {
            reason: format!("PNG decoder failed: {}", e),
            source: Some(Box::new(e)),
        }
    })?;
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels = rgb
        .pixels()
        .map(|p| {
            Rgb::new(
                p.0[0] as f32 / 255.0,
                p.0[1] as f32 / 255.0,
                p.0[2] as f32 / 255.0,
            )
        })
        .collect();
    PixelBuffer::from_pixels(width, height, pixels)
}

/// Hex SHA-256 of `bytes`
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
