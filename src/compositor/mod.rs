//! Compositor Module
//!
//! Drives the four camera layers into one shared target:
//! - Layer identities and lens descriptors
//! - Render source capability trait
//! - Shared color/depth target
//! - Scene camera registry seam
//! - Scoped render protocol

mod layer;
mod registry;
mod render;
mod source;
mod target;

pub use layer::{CameraDescriptor, CameraLayer, LayerKind, ParentBinding, CAMERA_PREFIX};
pub use registry::{GraphicsBackend, SceneCameraRegistry};
pub use render::{Compositor, LensOverrides};
pub use source::RenderSource;
pub use target::{RenderTarget, FAR_DEPTH};
