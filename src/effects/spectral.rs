//! Simulated out-of-band imaging
//!
//! Ultraviolet and infrared captures are approximated by remapping visible
//! channels the way dichromat vision collapses them:
//! - Ultraviolet (protanopia-style): (g, g, b)
//! - Infrared (tritanopia-style): (r, g, g)

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::effects::effect::{set_enabled_param, unknown_param, Effect, EffectParams};
use crate::effects::random::RandomSource;
use crate::error::Result;
use crate::raster::{PixelBuffer, Rgb};

/// Which band to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectralBand {
    Ultraviolet,
    Infrared,
}

impl SpectralBand {
    #[inline]
    pub fn remap(self, c: Rgb) -> Rgb {
        match self {
            SpectralBand::Ultraviolet => Rgb::new(c.g, c.g, c.b),
            SpectralBand::Infrared => Rgb::new(c.r, c.g, c.g),
        }
    }
}

/// Channel remapping effect for ultraviolet/infrared captures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralShift {
    params: EffectParams,
    band: SpectralBand,
}

impl SpectralShift {
    pub fn new(band: SpectralBand) -> Self {
        Self {
            params: EffectParams::default(),
            band,
        }
    }

    pub fn ultraviolet() -> Self {
        Self::new(SpectralBand::Ultraviolet)
    }

    pub fn infrared() -> Self {
        Self::new(SpectralBand::Infrared)
    }

    pub fn band(&self) -> SpectralBand {
        self.band
    }
}

impl Effect for SpectralShift {
    fn effect_type(&self) -> &'static str {
        match self.band {
            SpectralBand::Ultraviolet => "ultraviolet",
            SpectralBand::Infrared => "infrared",
        }
    }

    fn display_name(&self) -> &str {
        match self.band {
            SpectralBand::Ultraviolet => "Ultraviolet (simulated)",
            SpectralBand::Infrared => "Infrared (simulated)",
        }
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

    fn box_clone(&self) -> Box<dyn Effect> {
        Box::new(self.clone())
    }

    fn apply(&mut self, buffer: &mut PixelBuffer, _rng: &mut dyn RandomSource) {
        if !self.params.enabled {
            return;
        }
        let band = self.band;
        buffer.map_in_place(|c| band.remap(c));
    }

    fn get_params(&self) -> Value {
        json!({
            "band": self.band,
            "enabled": self.params.enabled,
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "enabled" => set_enabled_param(&mut self.params, value),
            _ => Err(unknown_param(name, self.effect_type())),
        }
    }
}
