//! Camera layers of the capture rig

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compositor::source::RenderSource;

/// Prefix given to the rig's own copies of the reference cameras
pub const CAMERA_PREFIX: &str = "Tantares_";

/// The four camera layers, declared in draw order (back to front)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Distant skybox
    Galaxy,
    /// Scaled-space planetary view
    Scaled,
    /// Far-field local scene
    Far,
    /// Near-field local scene
    Near,
}

impl LayerKind {
    /// Every layer, back to front
    pub const DRAW_ORDER: [LayerKind; 4] = [
        LayerKind::Galaxy,
        LayerKind::Scaled,
        LayerKind::Far,
        LayerKind::Near,
    ];

    /// Name of the host camera this layer copies its lens from
    pub fn reference_camera_name(&self) -> &'static str {
        match self {
            LayerKind::Galaxy => "GalaxyCamera",
            LayerKind::Scaled => "Camera ScaledSpace",
            LayerKind::Far => "UIMainCamera",
            LayerKind::Near => "Camera 00",
        }
    }

    /// Where the layer's camera hangs in the transform hierarchy
    pub fn parent_binding(&self) -> ParentBinding {
        match self {
            LayerKind::Near | LayerKind::Far => ParentBinding::CaptureMount,
            LayerKind::Scaled => ParentBinding::Detached,
            LayerKind::Galaxy => ParentBinding::GalaxyRoot,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerKind::Galaxy => "galaxy",
            LayerKind::Scaled => "scaled",
            LayerKind::Far => "far",
            LayerKind::Near => "near",
        };
        f.write_str(name)
    }
}

/// Transform parent of a layer camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentBinding {
    /// Child of the part's camera transform, zero local offset
    CaptureMount,
    /// No parent; position is synced into scaled space each frame
    Detached,
    /// Child of the galaxy cube root; only rotation follows the mount
    GalaxyRoot,
}

/// Lens and hierarchy settings for one layer camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub name: String,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    pub parent: ParentBinding,
}

impl CameraDescriptor {
    pub fn new(name: impl Into<String>, field_of_view: f32, near_clip: f32, far_clip: f32) -> Self {
        Self {
            name: name.into(),
            field_of_view,
            near_clip,
            far_clip,
            parent: ParentBinding::Detached,
        }
    }

    /// Reference descriptor as a host scene would report it for `kind`
    pub fn reference(kind: LayerKind) -> Self {
        let (near_clip, far_clip) = match kind {
            LayerKind::Near => (0.21, 750.0),
            LayerKind::Far => (300.0, 750_000.0),
            LayerKind::Scaled => (1.0, 3.0e7),
            LayerKind::Galaxy => (0.1, 20.0),
        };
        let mut descriptor = Self::new(kind.reference_camera_name(), 60.0, near_clip, far_clip);
        descriptor.parent = kind.parent_binding();
        descriptor
    }
}

/// One camera of the rig together with its render source
pub struct CameraLayer {
    kind: LayerKind,
    reference: CameraDescriptor,
    field_of_view: Option<f32>,
    near_clip: Option<f32>,
    source: Box<dyn RenderSource>,
}

impl CameraLayer {
    /// Wrap a source created for `kind`, copying the reference lens
    ///
    /// The source is configured immediately and left disabled.
    pub fn new(kind: LayerKind, reference: CameraDescriptor, source: Box<dyn RenderSource>) -> Self {
        let mut layer = Self {
            kind,
            reference,
            field_of_view: None,
            near_clip: None,
            source,
        };
        layer.reconfigure();
        layer.source.set_enabled(false);
        layer
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_enabled()
    }

    pub fn field_of_view_override(&self) -> Option<f32> {
        self.field_of_view
    }

    pub fn near_clip_override(&self) -> Option<f32> {
        self.near_clip
    }

    /// Override (or with `None` restore) the field of view
    pub fn set_field_of_view(&mut self, fov: Option<f32>) {
        self.field_of_view = fov;
        self.reconfigure();
    }

    /// Override (or with `None` restore) the near clip plane
    pub fn set_near_clip(&mut self, near_clip: Option<f32>) {
        self.near_clip = near_clip;
        self.reconfigure();
    }

    /// Descriptor the source is currently configured with
    pub fn effective_descriptor(&self) -> CameraDescriptor {
        CameraDescriptor {
            name: format!("{}{}", CAMERA_PREFIX, self.reference.name),
            field_of_view: self.field_of_view.unwrap_or(self.reference.field_of_view),
            near_clip: self.near_clip.unwrap_or(self.reference.near_clip),
            far_clip: self.reference.far_clip,
            parent: self.kind.parent_binding(),
        }
    }

    pub(crate) fn source_mut(&mut self) -> &mut dyn RenderSource {
        self.source.as_mut()
    }

    fn reconfigure(&mut self) {
        let descriptor = self.effective_descriptor();
        self.source.configure(&descriptor);
    }
}

impl fmt::Debug for CameraLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraLayer")
            .field("kind", &self.kind)
            .field("reference", &self.reference.name)
            .field("enabled", &self.is_enabled())
            .field("field_of_view", &self.field_of_view)
            .field("near_clip", &self.near_clip)
            .finish()
    }
}
