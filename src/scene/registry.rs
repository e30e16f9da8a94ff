//! In-memory scene camera registry
//!
//! Stands in for a host scene: holds a reference descriptor and a primitive
//! list per layer, and hands out `FlatSource`s on request.

use std::collections::BTreeMap;

use crate::compositor::{CameraDescriptor, LayerKind, RenderSource, SceneCameraRegistry};
use crate::raster::Rgb;
use crate::scene::flat::{FlatSource, Paint, Primitive, Shape};

/// Default name of the part transform the near/far cameras hang from
pub const DEFAULT_MOUNT_NAME: &str = "cameraTransform";

/// Registry backed by fixed per-layer primitive lists
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    mounts: Vec<String>,
    layers: BTreeMap<LayerKind, (CameraDescriptor, Vec<Primitive>)>,
}

impl StaticRegistry {
    /// Registry with no mounts and no cameras
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mount(mut self, name: impl Into<String>) -> Self {
        self.mounts.push(name.into());
        self
    }

    /// Register `kind` with its reference descriptor and `primitives`
    pub fn with_layer(mut self, kind: LayerKind, primitives: Vec<Primitive>) -> Self {
        self.layers
            .insert(kind, (CameraDescriptor::reference(kind), primitives));
        self
    }

    /// Register `kind` with an explicit descriptor
    pub fn with_descriptor(
        mut self,
        kind: LayerKind,
        descriptor: CameraDescriptor,
        primitives: Vec<Primitive>,
    ) -> Self {
        self.layers.insert(kind, (descriptor, primitives));
        self
    }

    pub fn without_layer(mut self, kind: LayerKind) -> Self {
        self.layers.remove(&kind);
        self
    }

    /// Number of layers with a descriptor
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// A small orbital scene: starfield, planet limb, distant station, strut
    pub fn demo() -> Self {
        let galaxy = vec![
            Primitive::new(
                Shape::Fill,
                Paint::Vertical(Rgb::new(0.02, 0.02, 0.06), Rgb::new(0.05, 0.03, 0.10)),
                1.0,
            ),
            Primitive::solid(Shape::Stars { density: 0.015 }, Rgb::new(0.9, 0.9, 1.0), 0.99),
        ];
        let scaled = vec![
            Primitive::solid(
                Shape::Disc {
                    cx: 0.5,
                    cy: 1.35,
                    radius: 0.72,
                },
                Rgb::new(0.55, 0.75, 0.95),
                0.91,
            ),
            Primitive::new(
                Shape::Disc {
                    cx: 0.5,
                    cy: 1.35,
                    radius: 0.70,
                },
                Paint::Vertical(Rgb::new(0.15, 0.35, 0.75), Rgb::new(0.05, 0.30, 0.20)),
                0.9,
            ),
        ];
        let far = vec![
            Primitive::solid(
                Shape::Rect {
                    x0: 0.62,
                    y0: 0.28,
                    x1: 0.70,
                    y1: 0.31,
                },
                Rgb::new(0.75, 0.75, 0.72),
                0.5,
            ),
            Primitive::solid(
                Shape::Rect {
                    x0: 0.655,
                    y0: 0.22,
                    x1: 0.665,
                    y1: 0.37,
                },
                Rgb::new(0.85, 0.65, 0.25),
                0.49,
            ),
        ];
        let near = vec![Primitive::solid(
            Shape::Rect {
                x0: 0.0,
                y0: 0.82,
                x1: 0.35,
                y1: 0.88,
            },
            Rgb::new(0.35, 0.33, 0.30),
            0.05,
        )];

        Self::new()
            .with_mount(DEFAULT_MOUNT_NAME)
            .with_layer(LayerKind::Galaxy, galaxy)
            .with_layer(LayerKind::Scaled, scaled)
            .with_layer(LayerKind::Far, far)
            .with_layer(LayerKind::Near, near)
    }
}

impl SceneCameraRegistry for StaticRegistry {
    fn has_mount(&self, name: &str) -> bool {
        self.mounts.iter().any(|m| m == name)
    }

    fn lookup(&self, kind: LayerKind) -> Option<CameraDescriptor> {
        self.layers.get(&kind).map(|(d, _)| d.clone())
    }

    fn create_source(&self, kind: LayerKind) -> Option<Box<dyn RenderSource>> {
        self.layers
            .get(&kind)
            .map(|(_, p)| Box::new(FlatSource::new(kind, p.clone())) as Box<dyn RenderSource>)
    }
}
