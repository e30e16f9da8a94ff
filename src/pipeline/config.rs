//! Capture configuration
//!
//! Persisted as pretty JSON. Missing fields fall back to the camera part's
//! stock values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compositor::GraphicsBackend;
use crate::effects::{DamagePolicy, EffectOrder};
use crate::error::{CaptureError, Result};
use crate::pipeline::request::CameraType;
use crate::raster::MAX_RESOLUTION;
use crate::scene::DEFAULT_MOUNT_NAME;

/// Default capture resolution per axis
pub const DEFAULT_RESOLUTION: u32 = 256;

/// Default preview resolution per axis
pub const DEFAULT_PREVIEW_RESOLUTION: u32 = 128;

/// Default lens field of view in degrees
pub const DEFAULT_FIELD_OF_VIEW: f32 = 60.0;

/// Error damage settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorSettings {
    pub enabled: bool,
    /// Percentage threshold, 0-100
    pub rate: u8,
    pub policy: DamagePolicy,
}

impl Default for ErrorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 1,
            policy: DamagePolicy::default(),
        }
    }
}

/// Noise settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub enabled: bool,
    /// Maximum blend strength in percent, 0-100
    pub max_strength: u8,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_strength: 10,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Scene object the near and far cameras are parented to
    pub mount_name: String,
    pub camera_type: CameraType,
    /// Lens field of view applied to every layer; `None` keeps each
    /// reference camera's own
    pub field_of_view: Option<f32>,
    pub horizontal_resolution: u32,
    pub vertical_resolution: u32,
    pub errors: ErrorSettings,
    pub noise: NoiseSettings,
    pub effect_order: EffectOrder,
    pub preview_horizontal_resolution: u32,
    pub preview_vertical_resolution: u32,
    pub backend: GraphicsBackend,
    /// Directory captures are written to
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mount_name: DEFAULT_MOUNT_NAME.to_string(),
            camera_type: CameraType::default(),
            field_of_view: Some(DEFAULT_FIELD_OF_VIEW),
            horizontal_resolution: DEFAULT_RESOLUTION,
            vertical_resolution: DEFAULT_RESOLUTION,
            errors: ErrorSettings::default(),
            noise: NoiseSettings::default(),
            effect_order: EffectOrder::default(),
            preview_horizontal_resolution: DEFAULT_PREVIEW_RESOLUTION,
            preview_vertical_resolution: DEFAULT_PREVIEW_RESOLUTION,
            backend: GraphicsBackend::default(),
            output_dir: PathBuf::from("Screenshots"),
            file_prefix: "neptune-image".to_string(),
        }
    }
}

impl CaptureConfig {
    /// Load and validate a configuration file
    ///
    /// # Arguments
    /// * `path` - JSON file to read
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: CaptureConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| CaptureError::Persist {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.horizontal_resolution == 0 || self.vertical_resolution == 0 {
            return Err(CaptureError::InvalidResolution {
                width: self.horizontal_resolution,
                height: self.vertical_resolution,
            });
        }
        if self.horizontal_resolution > MAX_RESOLUTION || self.vertical_resolution > MAX_RESOLUTION
        {
            return Err(CaptureError::InvalidResolution {
                width: self.horizontal_resolution,
                height: self.vertical_resolution,
            });
        }
        if self.preview_horizontal_resolution == 0 || self.preview_vertical_resolution == 0 {
            return Err(CaptureError::InvalidResolution {
                width: self.preview_horizontal_resolution,
                height: self.preview_vertical_resolution,
            });
        }
        if self.preview_horizontal_resolution > self.horizontal_resolution
            || self.preview_vertical_resolution > self.vertical_resolution
        {
            return Err(CaptureError::InvalidConfig {
                reason: format!(
                    "preview {}x{} is larger than capture {}x{}",
                    self.preview_horizontal_resolution,
                    self.preview_vertical_resolution,
                    self.horizontal_resolution,
                    self.vertical_resolution
                ),
            });
        }
        if let Some(fov) = self.field_of_view {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(CaptureError::InvalidConfig {
                    reason: format!("field of view {} is outside (0, 180)", fov),
                });
            }
        }
        if self.errors.rate > 100 {
            return Err(CaptureError::InvalidConfig {
                reason: format!("error rate {} exceeds 100", self.errors.rate),
            });
        }
        if self.noise.max_strength > 100 {
            return Err(CaptureError::InvalidConfig {
                reason: format!("noise strength {} exceeds 100", self.noise.max_strength),
            });
        }
        if self.mount_name.trim().is_empty() {
            return Err(CaptureError::InvalidConfig {
                reason: "mount name is empty".to_string(),
            });
        }
        Ok(())
    }
}
