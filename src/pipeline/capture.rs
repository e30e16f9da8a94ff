//! Capture pipeline
//!
//! Owns the camera rig, the capture and preview targets, the effect
//! randomness and the sink. `capture` is the boundary where every failure is
//! logged and swallowed; `try_capture` runs the same sequence and returns the
//! error instead.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::compositor::{Compositor, LensOverrides, RenderTarget, SceneCameraRegistry};
use crate::effects::{EffectChain, RandomSource};
use crate::error::{CaptureError, Result};
use crate::pipeline::config::CaptureConfig;
use crate::pipeline::request::{CaptureRequest, CaptureType};
use crate::pipeline::sink::ImageSink;
use crate::raster::{encode_png, PixelBuffer};

/// Summary of one completed capture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureReceipt {
    pub capture_type: CaptureType,
    pub width: u32,
    pub height: u32,
    /// Effects that ran, in order
    pub effects: Vec<&'static str>,
    /// File written by the sink, if it writes files
    pub path: Option<PathBuf>,
    pub bytes: usize,
    pub checksum: String,
    pub captured_at: DateTime<Utc>,
}

/// Live preview overlay state
#[derive(Debug)]
struct PreviewState {
    target: RenderTarget,
    raster: Option<PixelBuffer>,
    frames: u64,
}

/// Composite capture pipeline for one camera part
pub struct CapturePipeline<S: ImageSink> {
    config: CaptureConfig,
    /// `None` when setup failed; the pipeline is then inert
    compositor: Option<Compositor>,
    target: Option<RenderTarget>,
    preview: Option<PreviewState>,
    inert_reason: Option<String>,
    sink: S,
    rng: Box<dyn RandomSource>,
}

impl<S: ImageSink> CapturePipeline<S> {
    /// Build the camera rig from the host scene
    ///
    /// Setup never fails outright. A missing mount, an invalid config or a
    /// registry with no camera descriptors is logged and leaves the pipeline
    /// inert: later captures log and return `None`.
    ///
    /// # Arguments
    /// * `config` - Resolution, effect and output settings
    /// * `registry` - Scene cameras to clone the layers from
    /// * `sink` - Destination for encoded captures
    /// * `rng` - Randomness for damage and noise
    pub fn setup(
        config: CaptureConfig,
        registry: &dyn SceneCameraRegistry,
        sink: S,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let mut pipeline = Self {
            config,
            compositor: None,
            target: None,
            preview: None,
            inert_reason: None,
            sink,
            rng,
        };

        match pipeline.build_rig(registry) {
            Ok((compositor, target)) => {
                info!(
                    "[capture] pipeline ready: layers {:?}, {}x{} on {:?}",
                    compositor.layer_kinds(),
                    target.width(),
                    target.height(),
                    compositor.backend()
                );
                pipeline.compositor = Some(compositor);
                pipeline.target = Some(target);
            }
            Err(e) => {
                error!(
                    "[capture] setup failed [{}]: {}; pipeline is inert",
                    e.error_code(),
                    e
                );
                pipeline.inert_reason = Some(e.to_string());
            }
        }

        pipeline
    }

    fn build_rig(&self, registry: &dyn SceneCameraRegistry) -> Result<(Compositor, RenderTarget)> {
        self.config.validate()?;

        if !registry.has_mount(&self.config.mount_name) {
            return Err(CaptureError::MissingMount {
                name: self.config.mount_name.clone(),
            });
        }

        let overrides = LensOverrides {
            field_of_view: self.config.field_of_view,
            near_clip: None,
        };
        let compositor = Compositor::from_registry(registry, overrides, self.config.backend)?;
        let target = RenderTarget::new(
            self.config.horizontal_resolution,
            self.config.vertical_resolution,
        )?;
        Ok((compositor, target))
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// True when setup failed and captures are no-ops
    pub fn is_inert(&self) -> bool {
        self.compositor.is_none()
    }

    /// Why setup failed, if it did
    pub fn inert_reason(&self) -> Option<&str> {
        self.inert_reason.as_deref()
    }

    pub fn compositor(&self) -> Option<&Compositor> {
        self.compositor.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Capture types the configured camera type offers
    ///
    /// Informational for menu glue; `capture` accepts any type.
    pub fn available_capture_types(&self) -> Vec<CaptureType> {
        self.config.camera_type.available_capture_types()
    }

    /// Change the lens field of view of every layer
    ///
    /// # Errors
    /// `InvalidParameter` unless `0 < fov < 180`
    pub fn set_field_of_view(&mut self, fov: f32) -> Result<()> {
        if !(fov > 0.0 && fov < 180.0) {
            return Err(CaptureError::InvalidParameter {
                name: "field_of_view".to_string(),
                reason: format!("{} is outside (0, 180)", fov),
            });
        }
        self.config.field_of_view = Some(fov);
        if let Some(compositor) = self.compositor.as_mut() {
            compositor.set_field_of_view(Some(fov));
        }
        debug!("[capture] field of view set to {}", fov);
        Ok(())
    }

    fn inert_error(&self) -> CaptureError {
        CaptureError::Inert {
            reason: self
                .inert_reason
                .clone()
                .unwrap_or_else(|| "camera rig not set up".to_string()),
        }
    }

    /// Take one capture; failures are logged and yield `None`
    pub fn capture(&mut self, capture_type: CaptureType) -> Option<CaptureReceipt> {
        match self.try_capture(capture_type) {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                error!(
                    "[capture] {} capture failed at {} stage [{}]: {}",
                    capture_type,
                    e.stage(),
                    e.error_code(),
                    e
                );
                None
            }
        }
    }

    /// Take one capture and return any failure
    ///
    /// Renders all layers, runs the effect chain, encodes PNG and hands it to
    /// the sink. Nothing reaches the sink unless every earlier step succeeds.
    pub fn try_capture(&mut self, capture_type: CaptureType) -> Result<CaptureReceipt> {
        let inert = self.inert_error();
        let (Some(compositor), Some(target)) = (self.compositor.as_mut(), self.target.as_mut())
        else {
            return Err(inert);
        };

        let request = CaptureRequest::from_config(&self.config, capture_type);
        let mut raster = compositor.render(target)?;
        request.check_raster(&raster)?;

        let mut chain = EffectChain::for_request(&request);
        chain.apply(&mut raster, self.rng.as_mut());
        let effects = chain.effect_types();

        let encoded = encode_png(&raster, capture_type.tag())?;
        let stored = self.sink.persist(&encoded)?;

        info!(
            "[capture] {} captured {}x{} ({} bytes, effects {:?})",
            capture_type,
            raster.width(),
            raster.height(),
            stored.bytes,
            effects
        );

        Ok(CaptureReceipt {
            capture_type,
            width: raster.width(),
            height: raster.height(),
            effects,
            path: stored.path,
            bytes: stored.bytes,
            checksum: stored.checksum,
            captured_at: Utc::now(),
        })
    }

    /// Open the preview overlay with its own smaller target
    pub fn open_preview(&mut self) -> Result<()> {
        if self.is_inert() {
            return Err(self.inert_error());
        }
        if self.preview.is_none() {
            let target = RenderTarget::new(
                self.config.preview_horizontal_resolution,
                self.config.preview_vertical_resolution,
            )?;
            self.preview = Some(PreviewState {
                target,
                raster: None,
                frames: 0,
            });
            debug!("[capture] preview opened");
        }
        Ok(())
    }

    /// Close the overlay and release its target
    pub fn close_preview(&mut self) {
        if self.preview.take().is_some() {
            debug!("[capture] preview closed");
        }
    }

    pub fn is_preview_open(&self) -> bool {
        self.preview.is_some()
    }

    /// Per-frame preview refresh
    ///
    /// Same layered render as a capture, into the preview target, with no
    /// effects and no persistence. Returns true if the raster was refreshed.
    pub fn preview_capture(&mut self) -> bool {
        let (Some(compositor), Some(preview)) = (self.compositor.as_mut(), self.preview.as_mut())
        else {
            return false;
        };

        match compositor.render(&mut preview.target) {
            Ok(raster) => {
                preview.raster = Some(raster);
                preview.frames += 1;
                true
            }
            Err(e) => {
                warn!(
                    "[capture] preview frame failed at {} stage [{}]: {}",
                    e.stage(),
                    e.error_code(),
                    e
                );
                false
            }
        }
    }

    /// Raster shown in the preview overlay
    pub fn preview_raster(&self) -> Option<&PixelBuffer> {
        self.preview.as_ref().and_then(|p| p.raster.as_ref())
    }

    /// Preview frames rendered since the overlay was opened
    pub fn preview_frames(&self) -> u64 {
        self.preview.as_ref().map_or(0, |p| p.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::SequenceSource;
    use crate::pipeline::sink::MemorySink;
    use crate::scene::StaticRegistry;

    fn quiet_config() -> CaptureConfig {
        let mut config = CaptureConfig::default();
        config.horizontal_resolution = 16;
        config.vertical_resolution = 12;
        config.preview_horizontal_resolution = 8;
        config.preview_vertical_resolution = 6;
        config.errors.enabled = false;
        config.noise.enabled = false;
        config
    }

    fn demo_pipeline(config: CaptureConfig) -> CapturePipeline<MemorySink> {
        CapturePipeline::setup(
            config,
            &StaticRegistry::demo(),
            MemorySink::new(),
            Box::new(SequenceSource::constant(0)),
        )
    }

    #[test]
    fn test_capture_demo_scene() {
        let mut pipeline = demo_pipeline(quiet_config());
        assert!(!pipeline.is_inert());

        let receipt = pipeline.capture(CaptureType::FullColour).unwrap();
        assert_eq!((receipt.width, receipt.height), (16, 12));
        assert!(receipt.effects.is_empty());
        assert_eq!(pipeline.sink().len(), 1);
        assert_eq!(pipeline.sink().last().unwrap().tag, "FULL_COLOUR");
    }

    #[test]
    fn test_missing_mount_is_inert() {
        let mut config = quiet_config();
        config.mount_name = "dockingPort".to_string();
        let mut pipeline = demo_pipeline(config);

        assert!(pipeline.is_inert());
        assert!(pipeline.inert_reason().unwrap().contains("dockingPort"));
        assert!(pipeline.capture(CaptureType::Red).is_none());
        assert!(pipeline.sink().is_empty());
    }

    #[test]
    fn test_invalid_config_is_inert() {
        let mut config = quiet_config();
        config.horizontal_resolution = 0;
        let pipeline = demo_pipeline(config);
        assert!(pipeline.is_inert());
    }

    #[test]
    fn test_oversized_resolution_is_inert() {
        let mut config = quiet_config();
        config.horizontal_resolution = u32::MAX;
        config.vertical_resolution = u32::MAX;
        config.preview_horizontal_resolution = 1;
        config.preview_vertical_resolution = 1;
        let mut pipeline = demo_pipeline(config);

        assert!(pipeline.is_inert());
        assert!(pipeline.capture(CaptureType::FullColour).is_none());
        assert!(pipeline.open_preview().is_err());
    }

    #[test]
    fn test_set_field_of_view() {
        let mut pipeline = demo_pipeline(quiet_config());
        pipeline.set_field_of_view(30.0).unwrap();
        assert_eq!(pipeline.config().field_of_view, Some(30.0));
        for (_, descriptor) in pipeline.compositor().unwrap().descriptors() {
            assert_eq!(descriptor.field_of_view, 30.0);
        }
        assert!(pipeline.set_field_of_view(0.0).is_err());
        assert!(pipeline.set_field_of_view(200.0).is_err());
    }

    #[test]
    fn test_preview_requires_open_overlay() {
        let mut pipeline = demo_pipeline(quiet_config());
        assert!(!pipeline.preview_capture());

        pipeline.open_preview().unwrap();
        assert!(pipeline.preview_capture());
        assert!(pipeline.preview_capture());
        assert_eq!(pipeline.preview_frames(), 2);

        let raster = pipeline.preview_raster().unwrap();
        assert_eq!((raster.width(), raster.height()), (8, 6));
        assert!(pipeline.sink().is_empty());

        pipeline.close_preview();
        assert!(pipeline.preview_raster().is_none());
    }

    #[test]
    fn test_available_capture_types_follow_camera_type() {
        let mut config = quiet_config();
        config.camera_type = crate::pipeline::CameraType::Ultraviolet;
        let pipeline = demo_pipeline(config);
        assert_eq!(
            pipeline.available_capture_types(),
            vec![CaptureType::Ultraviolet]
        );
    }
}
