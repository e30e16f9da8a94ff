//! Pixel Buffer Management
//!
//! Provides the core RGB raster type every capture stage reads and writes.
//! Channels are 32-bit floats nominally in 0.0..=1.0; intermediate values may
//! leave that range and are clamped before encoding.

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Perceptual luminance weights (Rec. 601) used for greyscale conversion
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Largest accepted width or height of a capture or preview raster
pub const MAX_RESOLUTION: u32 = 16_384;

// ============================================================================
// Rgb
// ============================================================================

/// A single RGB sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Pure black
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    /// Pure white
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    /// Create a sample from its three channels
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Standard perceptual luminance of this sample
    #[inline]
    pub fn luminance(&self) -> f32 {
        LUMA_WEIGHTS[0] * self.r + LUMA_WEIGHTS[1] * self.g + LUMA_WEIGHTS[2] * self.b
    }

    /// Multiply every channel by `factor`
    #[inline]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Linear interpolation towards `other`
    ///
    /// `t = 0.0` returns `self`, `t = 1.0` returns `other`.
    #[inline]
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Clamp every channel to 0.0..=1.0
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// Check that every channel lies within 0.0..=1.0
    #[inline]
    pub fn is_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.r) && (0.0..=1.0).contains(&self.g) && (0.0..=1.0).contains(&self.b)
    }

    /// Quantize to 8-bit channels, clamping first
    #[inline]
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }
}

// ============================================================================
// Pixel Buffer
// ============================================================================

/// Width x height grid of RGB samples, stored row-major from the top-left
///
/// Dimensions are fixed for the lifetime of the buffer.
///
/// # Example
/// ```
/// use neptune_camera::raster::{PixelBuffer, Rgb};
///
/// let buffer = PixelBuffer::filled(4, 4, Rgb::new(0.8, 0.6, 0.4)).unwrap();
/// assert_eq!(buffer.len(), 16);
/// assert_eq!(buffer.get(3, 3), Some(Rgb::new(0.8, 0.6, 0.4)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    /// Create a black buffer
    ///
    /// # Errors
    /// `InvalidResolution` if either dimension is zero
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, Rgb::BLACK)
    }

    /// Create a buffer with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self> {
        Ok(Self {
            width,
            height,
            pixels: alloc_plane(width, height, color)?,
        })
    }

    /// Wrap existing row-major pixel data
    ///
    /// # Errors
    /// `InvalidResolution` for zero dimensions, `ReadBack` if the pixel count
    /// does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self> {
        check_resolution(width, height)?;
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(CaptureError::ReadBack {
                reason: format!(
                    "pixel data holds {} samples, {}x{} needs {}",
                    pixels.len(),
                    width,
                    height,
                    expected
                ),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false for a constructed buffer; provided alongside `len`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Get the pixel at (x, y), or None when out of bounds
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y)
    ///
    /// # Returns
    /// `false` if the coordinate is out of bounds
    pub fn set(&mut self, x: u32, y: u32, color: Rgb) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Apply `f` to every pixel in place
    pub fn map_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(Rgb) -> Rgb,
    {
        for pixel in self.pixels.iter_mut() {
            *pixel = f(*pixel);
        }
    }

    /// Clamp every channel to 0.0..=1.0
    pub fn clamp(&mut self) {
        self.map_in_place(Rgb::clamped);
    }

    /// Check that every channel of every pixel lies within 0.0..=1.0
    pub fn is_in_range(&self) -> bool {
        self.pixels.iter().all(Rgb::is_in_range)
    }

    /// Check that no channel is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.pixels
            .iter()
            .all(|p| p.r.is_finite() && p.g.is_finite() && p.b.is_finite())
    }

    /// Interleaved 8-bit RGB bytes, clamped, row-major
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.to_rgb8());
        }
        bytes
    }
}

fn check_resolution(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CaptureError::InvalidResolution { width, height });
    }
    Ok(())
}

/// Allocate a `width * height` plane filled with `value` without aborting
///
/// # Errors
/// `InvalidResolution` for zero dimensions, `AllocationFailed` when the
/// sample count overflows or the allocator refuses the request.
pub(crate) fn alloc_plane<T: Clone>(width: u32, height: u32, value: T) -> Result<Vec<T>> {
    check_resolution(width, height)?;
    let len = (width as usize)
        .checked_mul(height as usize)
        .ok_or(CaptureError::AllocationFailed { width, height })?;
    let mut plane = Vec::new();
    plane
        .try_reserve_exact(len)
        .map_err(|_| CaptureError::AllocationFailed { width, height })?;
    plane.resize(len, value);
    Ok(plane)
}

// ============================================================================
// Tests
// ============================================================================
