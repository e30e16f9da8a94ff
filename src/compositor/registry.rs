//! Scene camera registry
//!
//! The host scene owns the reference cameras. At setup the rig asks the
//! registry for each layer's descriptor and for a fresh source to drive.

use serde::{Deserialize, Serialize};

use crate::compositor::layer::{CameraDescriptor, LayerKind};
use crate::compositor::source::RenderSource;

/// Host-side lookup of reference cameras
pub trait SceneCameraRegistry {
    /// Whether the part carries a transform named `name` to mount cameras on
    fn has_mount(&self, name: &str) -> bool;

    /// Reference descriptor for `kind`, or `None` if the scene lacks it
    fn lookup(&self, kind: LayerKind) -> Option<CameraDescriptor>;

    /// New render source owned by the rig
    fn create_source(&self, kind: LayerKind) -> Option<Box<dyn RenderSource>>;
}

/// Host graphics API, which decides backend-specific layer skips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphicsBackend {
    #[default]
    #[serde(rename = "opengl")]
    OpenGl,
    #[serde(rename = "d3d9")]
    Direct3D9,
    #[serde(rename = "d3d11")]
    Direct3D11,
    #[serde(rename = "d3d12")]
    Direct3D12,
    #[serde(rename = "vulkan")]
    Vulkan,
    #[serde(rename = "metal")]
    Metal,
}

impl GraphicsBackend {
    /// Direct3D 11 cannot draw the far layer into a borrowed target
    pub fn skips_far_layer(&self) -> bool {
        matches!(self, GraphicsBackend::Direct3D11)
    }
}
