//! Effect trait definition
//!
//! Base trait for all image effects applied after composition.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::effects::random::RandomSource;
use crate::error::Result;
use crate::raster::PixelBuffer;

/// Parameters common to all effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectParams {
    /// Unique identifier for this effect instance
    pub id: String,
    /// Whether the effect is enabled
    pub enabled: bool,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            enabled: true,
        }
    }
}

/// Base trait for all image effects
///
/// Effects transform a pixel buffer in place. Every effect works per pixel
/// and never reads neighbouring samples. Effects that need randomness draw
/// it from the supplied source and nowhere else.
pub trait Effect: Send {
    /// Transform the buffer in place
    fn apply(&mut self, buffer: &mut PixelBuffer, rng: &mut dyn RandomSource);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Get human-readable display name
    fn display_name(&self) -> &str;

    /// Get the unique instance ID
    fn id(&self) -> &str;

    /// Set the unique instance ID
    fn set_id(&mut self, id: String);

    /// Check if effect is enabled
    fn is_enabled(&self) -> bool;

    /// Enable or disable the effect
    fn set_enabled(&mut self, enabled: bool);

    /// Get all parameters as JSON
    fn get_params(&self) -> Value;

    /// Set a single parameter by name
    fn set_param(&mut self, name: &str, value: &Value) -> Result<()>;

    /// Clone the effect into a boxed trait object
    fn box_clone(&self) -> Box<dyn Effect>;
}

impl Clone for Box<dyn Effect> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Helper macro to implement common Effect trait methods
#[macro_export]
macro_rules! impl_effect_common {
    ($type:ty, $effect_type:expr, $display_name:expr) => {
        fn effect_type(&self) -> &'static str {
            $effect_type
        }

        fn display_name(&self) -> &str {
            $display_name
        }

        fn id(&self) -> &str {
            &self.params.id
        }

        fn set_id(&mut self, id: String) {
            self.params.id = id;
        }

        fn is_enabled(&self) -> bool {
            self.params.enabled
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.params.enabled = enabled;
        }

        fn box_clone(&self) -> Box<dyn $crate::effects::Effect> {
            Box::new(self.clone())
        }
    };
}

/// Shared `set_param` handling for the `enabled` flag
pub(crate) fn set_enabled_param(params: &mut EffectParams, value: &Value) -> Result<()> {
    match value.as_bool() {
        Some(v) => {
            params.enabled = v;
            Ok(())
        }
        None => Err(invalid_param("enabled", value, "expected boolean")),
    }
}

/// Read a 0..=100 percentage parameter, clamping out-of-range numbers
pub(crate) fn percent_param(name: &str, value: &Value) -> Result<u8> {
    match value.as_i64() {
        Some(v) => Ok(clamp_percent(v)),
        None => Err(invalid_param(name, value, "expected integer")),
    }
}

/// Clamp an arbitrary integer into 0..=100
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

pub(crate) fn invalid_param(name: &str, value: &Value, reason: &str) -> crate::error::CaptureError {
    crate::error::CaptureError::InvalidParameter {
        name: name.to_string(),
        reason: format!("{}, got {}", reason, value),
    }
}

pub(crate) fn unknown_param(name: &str, effect_type: &str) -> crate::error::CaptureError {
    crate::error::CaptureError::InvalidParameter {
        name: name.to_string(),
        reason: format!("unknown parameter for {}", effect_type),
    }
}
