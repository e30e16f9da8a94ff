//! Layered render protocol
//!
//! Every render follows the same sequence:
//! 1. Enable the layers that will draw
//! 2. Bind all of them to the shared target
//! 3. Draw galaxy, scaled, far, near with no clears in between
//! 4. Read the color plane back
//!
//! Step 5, disabling and unbinding every layer, lives in a drop guard so it
//! runs on every exit path.

use std::ops::{Deref, DerefMut};

use log::{debug, warn};

use crate::compositor::layer::{CameraDescriptor, CameraLayer, LayerKind};
use crate::compositor::registry::{GraphicsBackend, SceneCameraRegistry};
use crate::compositor::target::RenderTarget;
use crate::error::{CaptureError, Result};
use crate::raster::PixelBuffer;

/// Lens overrides applied to every layer at setup
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LensOverrides {
    pub field_of_view: Option<f32>,
    pub near_clip: Option<f32>,
}

/// Four-layer camera rig drawing into a shared target
#[derive(Debug)]
pub struct Compositor {
    /// Present layers, sorted back to front
    layers: Vec<CameraLayer>,
    backend: GraphicsBackend,
}

impl Compositor {
    /// Build from explicit layers; they are sorted into draw order
    ///
    /// # Errors
    /// `NoCameraDescriptors` if `layers` is empty
    pub fn new(mut layers: Vec<CameraLayer>, backend: GraphicsBackend) -> Result<Self> {
        if layers.is_empty() {
            return Err(CaptureError::NoCameraDescriptors);
        }
        layers.sort_by_key(|l| l.kind());
        layers.dedup_by_key(|l| l.kind());
        Ok(Self { layers, backend })
    }

    /// Build the rig from the host scene
    ///
    /// Layers the registry has no descriptor for are skipped with a warning.
    ///
    /// # Errors
    /// `NoCameraDescriptors` if no layer could be set up
    pub fn from_registry(
        registry: &dyn SceneCameraRegistry,
        overrides: LensOverrides,
        backend: GraphicsBackend,
    ) -> Result<Self> {
        let mut layers = Vec::with_capacity(LayerKind::DRAW_ORDER.len());
        for kind in LayerKind::DRAW_ORDER {
            let Some(reference) = registry.lookup(kind) else {
                warn!(
                    "[compositor] reference camera '{}' not found, {} layer skipped",
                    kind.reference_camera_name(),
                    kind
                );
                continue;
            };
            let Some(source) = registry.create_source(kind) else {
                warn!("[compositor] no render source for {} layer, skipped", kind);
                continue;
            };
            let mut layer = CameraLayer::new(kind, reference, source);
            if overrides.field_of_view.is_some() {
                layer.set_field_of_view(overrides.field_of_view);
            }
            if overrides.near_clip.is_some() {
                layer.set_near_clip(overrides.near_clip);
            }
            debug!("[compositor] {} layer ready: {:?}", kind, layer.effective_descriptor());
            layers.push(layer);
        }
        Self::new(layers, backend)
    }

    pub fn backend(&self) -> GraphicsBackend {
        self.backend
    }

    /// Layer identities present in the rig, back to front
    pub fn layer_kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(CameraLayer::kind).collect()
    }

    /// Layers that draw under the current backend, back to front
    pub fn draw_sequence(&self) -> Vec<LayerKind> {
        self.layers
            .iter()
            .map(CameraLayer::kind)
            .filter(|k| self.draws(*k))
            .collect()
    }

    /// True if any layer is currently enabled
    pub fn any_enabled(&self) -> bool {
        self.layers.iter().any(CameraLayer::is_enabled)
    }

    /// Effective descriptor of each present layer
    pub fn descriptors(&self) -> Vec<(LayerKind, CameraDescriptor)> {
        self.layers
            .iter()
            .map(|l| (l.kind(), l.effective_descriptor()))
            .collect()
    }

    /// Change the field of view of every layer
    pub fn set_field_of_view(&mut self, fov: Option<f32>) {
        for layer in &mut self.layers {
            layer.set_field_of_view(fov);
        }
    }

    fn draws(&self, kind: LayerKind) -> bool {
        !(kind == LayerKind::Far && self.backend.skips_far_layer())
    }

    /// Run the full layered draw into `target` and read the color back
    ///
    /// The returned buffer has the target's resolution. Depth is never read.
    /// All layers are disabled and unbound when this returns, including on
    /// error.
    pub fn render(&mut self, target: &mut RenderTarget) -> Result<PixelBuffer> {
        let target_id = target.id();
        let skip_far = self.backend.skips_far_layer();

        let mut active = ActiveLayers::enable(&mut self.layers, skip_far);

        for layer in active.iter_mut() {
            layer.source_mut().bind_target(target_id);
        }

        target.reset();

        for layer in active.iter_mut() {
            let kind = layer.kind();
            if skip_far && kind == LayerKind::Far {
                debug!("[compositor] far layer skipped on {:?}", GraphicsBackend::Direct3D11);
                continue;
            }

            let source = layer.source_mut();
            let bound = source.bound_target();
            if bound != Some(target_id) {
                return Err(CaptureError::TargetMismatch {
                    layer: kind,
                    bound,
                    expected: target_id,
                });
            }

            debug!("[compositor] drawing {} layer", kind);
            source.render(target).map_err(|e| match e {
                CaptureError::RenderFailed { .. } => e,
                other => CaptureError::RenderFailed {
                    layer: kind,
                    reason: other.to_string(),
                },
            })?;
        }

        target.read_color()
    }
}

/// Enables layers for one render and disables/unbinds all of them on drop
struct ActiveLayers<'a> {
    layers: &'a mut [CameraLayer],
}

impl<'a> ActiveLayers<'a> {
    fn enable(layers: &'a mut [CameraLayer], skip_far: bool) -> Self {
        for layer in layers.iter_mut() {
            if skip_far && layer.kind() == LayerKind::Far {
                continue;
            }
            layer.source_mut().set_enabled(true);
        }
        Self { layers }
    }
}

impl Deref for ActiveLayers<'_> {
    type Target = [CameraLayer];

    fn deref(&self) -> &Self::Target {
        self.layers
    }
}

impl DerefMut for ActiveLayers<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.layers
    }
}

impl Drop for ActiveLayers<'_> {
    fn drop(&mut self) {
        for layer in self.layers.iter_mut() {
            let source = layer.source_mut();
            source.unbind_target();
            source.set_enabled(false);
        }
    }
}
