//! Shared color + depth accumulation target
//!
//! Layers draw into one `RenderTarget` in sequence. Nothing clears it between
//! layers; the depth buffer left by earlier layers decides what later layers
//! may overwrite. The compositor resets it once before each full sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::raster::buffer::alloc_plane;
use crate::raster::{PixelBuffer, Rgb};

/// Depth of an empty sample (farther than anything a layer can draw)
pub const FAR_DEPTH: f32 = f32::INFINITY;

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Color and depth planes of identical resolution
#[derive(Debug)]
pub struct RenderTarget {
    id: u64,
    width: u32,
    height: u32,
    color: Vec<Rgb>,
    depth: Vec<f32>,
}

impl RenderTarget {
    /// Allocate a cleared target
    ///
    /// # Errors
    /// `InvalidResolution` if either dimension is zero, `AllocationFailed`
    /// if the planes cannot be allocated
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let color = alloc_plane(width, height, Rgb::BLACK)?;
        let depth = alloc_plane(width, height, FAR_DEPTH)?;
        Ok(Self {
            id: NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            color,
            depth,
        })
    }

    /// Identity cameras bind to
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Black color, far depth
    pub fn reset(&mut self) {
        self.color.fill(Rgb::BLACK);
        self.depth.fill(FAR_DEPTH);
    }

    /// Depth-tested write of one sample
    ///
    /// Passes when `depth` is nearer than or equal to the stored depth, so a
    /// later layer wins ties. Out-of-bounds coordinates are ignored.
    ///
    /// # Returns
    /// `true` if the sample was written
    pub fn plot(&mut self, x: u32, y: u32, depth: f32, color: Rgb) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = y as usize * self.width as usize + x as usize;
        if depth <= self.depth[i] {
            self.depth[i] = depth;
            self.color[i] = color;
            true
        } else {
            false
        }
    }

    /// Copy the color plane into a new pixel buffer
    pub fn read_color(&self) -> Result<PixelBuffer> {
        PixelBuffer::from_pixels(self.width, self.height, self.color.clone())
    }
}
