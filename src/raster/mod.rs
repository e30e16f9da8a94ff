//! Raster Module
//!
//! Pixel storage and image encoding:
//! - RGB float pixel buffer
//! - PNG encode/decode

pub mod buffer;
pub mod io;

pub use buffer::{PixelBuffer, Rgb, LUMA_WEIGHTS, MAX_RESOLUTION};
pub use io::{checksum, decode_png, encode_png, EncodedImage};
