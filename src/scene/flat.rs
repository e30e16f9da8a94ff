//! Flat-shaded render source
//!
//! Draws a list of 2D primitives at fixed depths. Coordinates are normalized
//! (0.0..=1.0 from the top-left) so the same scene renders at any target
//! resolution, and the field of view zooms about the centre.

use crate::compositor::{CameraDescriptor, LayerKind, RenderSource, RenderTarget};
use crate::error::{CaptureError, Result};
use crate::raster::Rgb;

/// Field of view at which primitives appear at their nominal size
pub const REFERENCE_FOV: f32 = 60.0;

/// Coverage of a primitive in normalized scene coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Every sample
    Fill,
    /// Axis-aligned rectangle, `x0..x1` by `y0..y1`
    Rect { x0: f32, y0: f32, x1: f32, y1: f32 },
    /// Disc with radius in units of the image height
    Disc { cx: f32, cy: f32, radius: f32 },
    /// Sparse point field; roughly `density` of samples are lit
    Stars { density: f32 },
}

impl Shape {
    fn covers(&self, u: f32, v: f32, px: u32, py: u32, aspect: f32) -> bool {
        match *self {
            Shape::Fill => true,
            Shape::Rect { x0, y0, x1, y1 } => u >= x0 && u < x1 && v >= y0 && v < y1,
            Shape::Disc { cx, cy, radius } => {
                let dx = (u - cx) * aspect;
                let dy = v - cy;
                dx * dx + dy * dy <= radius * radius
            }
            Shape::Stars { density } => {
                let threshold = (density.clamp(0.0, 1.0) * u32::MAX as f32) as u32;
                star_hash(px, py) < threshold
            }
        }
    }
}

/// Integer hash for a stable star pattern
fn star_hash(x: u32, y: u32) -> u32 {
    let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0xC2B2_AE3D);
    h ^= h >> 13;
    h
}

/// How a primitive is coloured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgb),
    /// Top colour blending to bottom colour
    Vertical(Rgb, Rgb),
}

impl Paint {
    fn at(&self, v: f32) -> Rgb {
        match *self {
            Paint::Solid(c) => c,
            Paint::Vertical(top, bottom) => top.lerp(bottom, v.clamp(0.0, 1.0)),
        }
    }
}

/// One drawable element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub paint: Paint,
    /// Normalized depth, 0.0 nearest
    pub depth: f32,
}

impl Primitive {
    pub fn new(shape: Shape, paint: Paint, depth: f32) -> Self {
        Self {
            shape,
            paint,
            depth,
        }
    }

    pub fn solid(shape: Shape, color: Rgb, depth: f32) -> Self {
        Self::new(shape, Paint::Solid(color), depth)
    }
}

/// Render source drawing flat primitives
#[derive(Debug, Clone)]
pub struct FlatSource {
    layer: LayerKind,
    primitives: Vec<Primitive>,
    descriptor: Option<CameraDescriptor>,
    bound: Option<u64>,
    enabled: bool,
    renders: usize,
}

impl FlatSource {
    pub fn new(layer: LayerKind, primitives: Vec<Primitive>) -> Self {
        Self {
            layer,
            primitives,
            descriptor: None,
            bound: None,
            enabled: false,
            renders: 0,
        }
    }

    /// Descriptor last applied by `configure`
    pub fn descriptor(&self) -> Option<&CameraDescriptor> {
        self.descriptor.as_ref()
    }

    /// Completed draws since creation
    pub fn renders(&self) -> usize {
        self.renders
    }

    fn zoom(&self) -> f32 {
        match &self.descriptor {
            Some(d) if d.field_of_view > 0.0 => REFERENCE_FOV / d.field_of_view,
            _ => 1.0,
        }
    }
}

impl RenderSource for FlatSource {
    fn configure(&mut self, descriptor: &CameraDescriptor) {
        self.descriptor = Some(descriptor.clone());
    }

    fn bind_target(&mut self, target: u64) {
        self.bound = Some(target);
    }

    fn unbind_target(&mut self) {
        self.bound = None;
    }

    fn bound_target(&self) -> Option<u64> {
        self.bound
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn render(&mut self, target: &mut RenderTarget) -> Result<()> {
        if !self.enabled {
            return Err(CaptureError::RenderFailed {
                layer: self.layer,
                reason: "camera rendered while disabled".to_string(),
            });
        }

        let (width, height) = (target.width(), target.height());
        let aspect = width as f32 / height as f32;
        let zoom = self.zoom();

        for primitive in &self.primitives {
            for py in 0..height {
                let v_screen = (py as f32 + 0.5) / height as f32;
                let v = 0.5 + (v_screen - 0.5) / zoom;
                for px in 0..width {
                    let u = 0.5 + ((px as f32 + 0.5) / width as f32 - 0.5) / zoom;
                    if primitive.shape.covers(u, v, px, py, aspect) {
                        target.plot(px, py, primitive.depth, primitive.paint.at(v_screen));
                    }
                }
            }
        }

        self.renders += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_source(primitives: Vec<Primitive>, target: &RenderTarget) -> FlatSource {
        let mut source = FlatSource::new(LayerKind::Near, primitives);
        source.set_enabled(true);
        source.bind_target(target.id());
        source
    }

    #[test]
    fn test_rect_coverage() {
        let mut target = RenderTarget::new(4, 4).unwrap();
        let red = Rgb::new(1.0, 0.0, 0.0);
        let rect = Shape::Rect {
            x0: 0.0,
            y0: 0.0,
            x1: 0.5,
            y1: 0.5,
        };
        let mut source = enabled_source(vec![Primitive::solid(rect, red, 0.5)], &target);
        source.render(&mut target).unwrap();

        let color = target.read_color().unwrap();
        assert_eq!(color.get(0, 0), Some(red));
        assert_eq!(color.get(1, 1), Some(red));
        assert_eq!(color.get(2, 2), Some(Rgb::BLACK));
        assert_eq!(source.renders(), 1);
    }

    #[test]
    fn test_disabled_source_refuses_to_render() {
        let mut target = RenderTarget::new(2, 2).unwrap();
        let mut source = FlatSource::new(LayerKind::Far, vec![]);
        let err = source.render(&mut target).unwrap_err();
        assert_eq!(err.error_code(), "RENDER_FAILED");
    }

    #[test]
    fn test_narrow_fov_zooms_in() {
        let disc = Shape::Disc {
            cx: 0.5,
            cy: 0.5,
            radius: 0.2,
        };
        let white = Primitive::solid(disc, Rgb::WHITE, 0.5);

        let mut wide_target = RenderTarget::new(20, 20).unwrap();
        let mut wide = enabled_source(vec![white], &wide_target);
        wide.render(&mut wide_target).unwrap();

        let mut narrow_target = RenderTarget::new(20, 20).unwrap();
        let mut narrow = enabled_source(vec![white], &narrow_target);
        narrow.configure(&CameraDescriptor::new("test", 30.0, 0.1, 100.0));
        narrow.render(&mut narrow_target).unwrap();

        let lit = |t: &RenderTarget| {
            t.read_color()
                .unwrap()
                .pixels()
                .iter()
                .filter(|p| **p == Rgb::WHITE)
                .count()
        };
        assert!(lit(&narrow_target) > lit(&wide_target));
    }

    #[test]
    fn test_vertical_paint() {
        let paint = Paint::Vertical(Rgb::BLACK, Rgb::WHITE);
        assert_eq!(paint.at(0.0), Rgb::BLACK);
        assert_eq!(paint.at(1.0), Rgb::WHITE);
    }
}
