//! Capture selectors and per-call requests

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::effects::{DamagePolicy, EffectOrder};
use crate::error::CaptureError;
use crate::pipeline::config::CaptureConfig;
use crate::raster::PixelBuffer;

/// Output mode chosen for a single capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureType {
    #[serde(rename = "FULL_COLOUR")]
    FullColour,
    #[serde(rename = "RED_COLOUR")]
    Red,
    #[serde(rename = "GREEN_COLOUR")]
    Green,
    #[serde(rename = "BLUE_COLOUR")]
    Blue,
    #[serde(rename = "GREYSCALE_COLOUR")]
    Greyscale,
    #[serde(rename = "ULTRAVIOLET_COLOUR")]
    Ultraviolet,
    #[serde(rename = "INFRARED_COLOUR")]
    Infrared,
}

impl CaptureType {
    pub const ALL: [CaptureType; 7] = [
        CaptureType::FullColour,
        CaptureType::Red,
        CaptureType::Green,
        CaptureType::Blue,
        CaptureType::Greyscale,
        CaptureType::Ultraviolet,
        CaptureType::Infrared,
    ];

    /// Tag handed to sinks alongside the encoded bytes
    pub fn tag(&self) -> &'static str {
        match self {
            CaptureType::FullColour => "FULL_COLOUR",
            CaptureType::Red => "RED_COLOUR",
            CaptureType::Green => "GREEN_COLOUR",
            CaptureType::Blue => "BLUE_COLOUR",
            CaptureType::Greyscale => "GREYSCALE_COLOUR",
            CaptureType::Ultraviolet => "ULTRAVIOLET_COLOUR",
            CaptureType::Infrared => "INFRARED_COLOUR",
        }
    }

    /// Menu label used by the action glue
    pub fn label(&self) -> &'static str {
        match self {
            CaptureType::FullColour => "Capture Full Colour Image",
            CaptureType::Red => "Capture Red Image",
            CaptureType::Green => "Capture Green Image",
            CaptureType::Blue => "Capture Blue Image",
            CaptureType::Greyscale => "Capture Greyscale Image",
            CaptureType::Ultraviolet => "Capture Ultraviolet Image",
            CaptureType::Infrared => "Capture Infrared Image",
        }
    }
}

impl fmt::Display for CaptureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CaptureType {
    type Err = CaptureError;

    /// Accepts the full tags (`RED_COLOUR`) and short names (`red`, `uv`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        let capture_type = match normalized.as_str() {
            "FULL_COLOUR" | "FULL_COLOR" | "FULL" | "COLOUR" | "COLOR" => CaptureType::FullColour,
            "RED_COLOUR" | "RED" => CaptureType::Red,
            "GREEN_COLOUR" | "GREEN" => CaptureType::Green,
            "BLUE_COLOUR" | "BLUE" => CaptureType::Blue,
            "GREYSCALE_COLOUR" | "GREYSCALE" | "GRAYSCALE" | "GREY" | "GRAY" => {
                CaptureType::Greyscale
            }
            "ULTRAVIOLET_COLOUR" | "ULTRAVIOLET" | "UV" => CaptureType::Ultraviolet,
            "INFRARED_COLOUR" | "INFRARED" | "IR" => CaptureType::Infrared,
            _ => {
                return Err(CaptureError::UnknownCaptureType {
                    name: s.to_string(),
                })
            }
        };
        Ok(capture_type)
    }
}

/// Sensor fitted to the camera part; decides which captures it offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraType {
    #[default]
    #[serde(rename = "FULL_COLOUR")]
    FullColour,
    #[serde(rename = "RED_COLOUR")]
    Red,
    #[serde(rename = "GREEN_COLOUR")]
    Green,
    #[serde(rename = "BLUE_COLOUR")]
    Blue,
    #[serde(rename = "GREYSCALE_COLOUR")]
    Greyscale,
    #[serde(rename = "ULTRAVIOLET_COLOUR")]
    Ultraviolet,
    #[serde(rename = "INFRARED_COLOUR")]
    Infrared,
}

impl CameraType {
    /// Whether this sensor offers `capture_type`
    ///
    /// A full-colour sensor offers every visible-band capture; single-band
    /// and simulated sensors offer only their own.
    pub fn supports(&self, capture_type: CaptureType) -> bool {
        match (self, capture_type) {
            (CameraType::FullColour, CaptureType::FullColour)
            | (CameraType::FullColour, CaptureType::Red)
            | (CameraType::FullColour, CaptureType::Green)
            | (CameraType::FullColour, CaptureType::Blue)
            | (CameraType::FullColour, CaptureType::Greyscale) => true,
            (CameraType::Red, CaptureType::Red)
            | (CameraType::Green, CaptureType::Green)
            | (CameraType::Blue, CaptureType::Blue)
            | (CameraType::Greyscale, CaptureType::Greyscale)
            | (CameraType::Ultraviolet, CaptureType::Ultraviolet)
            | (CameraType::Infrared, CaptureType::Infrared) => true,
            _ => false,
        }
    }

    /// Capture types offered by this sensor, in menu order
    pub fn available_capture_types(&self) -> Vec<CaptureType> {
        CaptureType::ALL
            .iter()
            .copied()
            .filter(|t| self.supports(*t))
            .collect()
    }
}

impl fmt::Display for CameraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            CameraType::FullColour => "FULL_COLOUR",
            CameraType::Red => "RED_COLOUR",
            CameraType::Green => "GREEN_COLOUR",
            CameraType::Blue => "BLUE_COLOUR",
            CameraType::Greyscale => "GREYSCALE_COLOUR",
            CameraType::Ultraviolet => "ULTRAVIOLET_COLOUR",
            CameraType::Infrared => "INFRARED_COLOUR",
        };
        f.write_str(tag)
    }
}

impl FromStr for CameraType {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let camera_type = match s.parse::<CaptureType>() {
            Ok(CaptureType::FullColour) => CameraType::FullColour,
            Ok(CaptureType::Red) => CameraType::Red,
            Ok(CaptureType::Green) => CameraType::Green,
            Ok(CaptureType::Blue) => CameraType::Blue,
            Ok(CaptureType::Greyscale) => CameraType::Greyscale,
            Ok(CaptureType::Ultraviolet) => CameraType::Ultraviolet,
            Ok(CaptureType::Infrared) => CameraType::Infrared,
            Err(_) => {
                return Err(CaptureError::UnknownCameraType {
                    name: s.to_string(),
                })
            }
        };
        Ok(camera_type)
    }
}

/// Everything one capture call needs; built fresh per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub capture_type: CaptureType,
    pub width: u32,
    pub height: u32,
    /// Error rate when damage is enabled
    pub damage: Option<u8>,
    /// Maximum strength when noise is enabled
    pub noise: Option<u8>,
    pub damage_policy: DamagePolicy,
    pub effect_order: EffectOrder,
}

impl CaptureRequest {
    /// Request with no damage or noise and canonical ordering
    pub fn plain(capture_type: CaptureType, width: u32, height: u32) -> Self {
        Self {
            capture_type,
            width,
            height,
            damage: None,
            noise: None,
            damage_policy: DamagePolicy::default(),
            effect_order: EffectOrder::default(),
        }
    }

    /// Build the request for `capture_type` from the pipeline configuration
    pub fn from_config(config: &CaptureConfig, capture_type: CaptureType) -> Self {
        Self {
            capture_type,
            width: config.horizontal_resolution,
            height: config.vertical_resolution,
            damage: config.errors.enabled.then_some(config.errors.rate),
            noise: config.noise.enabled.then_some(config.noise.max_strength),
            damage_policy: config.errors.policy,
            effect_order: config.effect_order,
        }
    }

    /// Check a read-back raster has the requested resolution
    ///
    /// # Errors
    /// `ReadBack` when the dimensions differ
    pub fn check_raster(&self, raster: &PixelBuffer) -> Result<(), CaptureError> {
        if (raster.width(), raster.height()) != (self.width, self.height) {
            return Err(CaptureError::ReadBack {
                reason: format!(
                    "read back {}x{}, requested {}x{}",
                    raster.width(),
                    raster.height(),
                    self.width,
                    self.height
                ),
            });
        }
        Ok(())
    }

    pub fn with_damage(mut self, rate: u8) -> Self {
        self.damage = Some(rate);
        self
    }

    pub fn with_noise(mut self, max_strength: u8) -> Self {
        self.noise = Some(max_strength);
        self
    }
}
