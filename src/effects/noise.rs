//! Sensor noise
//!
//! Every pixel is pulled towards black or white by a random strength below
//! the configured maximum.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::effects::effect::{
    clamp_percent, percent_param, set_enabled_param, unknown_param, Effect, EffectParams,
};
use crate::effects::random::RandomSource;
use crate::error::Result;
use crate::impl_effect_common;
use crate::raster::{PixelBuffer, Rgb};

/// Randomised black/white blend per pixel
///
/// For each pixel: `s` in `0..max_strength`, parity roll `p` in `0..100`,
/// then `lerp(pixel, p even ? black : white, s / 100)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Noise {
    params: EffectParams,
    max_strength: u8,
}

impl Noise {
    /// Create a noise effect; `max_strength` is clamped to 0..=100
    pub fn new(max_strength: i64) -> Self {
        Self {
            params: EffectParams::default(),
            max_strength: clamp_percent(max_strength),
        }
    }

    pub fn max_strength(&self) -> u8 {
        self.max_strength
    }

    pub fn set_max_strength(&mut self, max_strength: i64) {
        self.max_strength = clamp_percent(max_strength);
    }
}

impl Effect for Noise {
    impl_effect_common!(Noise, "noise", "Sensor Noise");

    fn apply(&mut self, buffer: &mut PixelBuffer, rng: &mut dyn RandomSource) {
        if !self.params.enabled || self.max_strength == 0 {
            return;
        }
        let max = u32::from(self.max_strength);
        for pixel in buffer.pixels_mut() {
            let strength = rng.next_below(max) as f32 / 100.0;
            let target = if rng.next_below(100) % 2 == 0 {
                Rgb::BLACK
            } else {
                Rgb::WHITE
            };
            *pixel = pixel.lerp(target, strength);
        }
    }

    fn get_params(&self) -> Value {
        json!({
            "max_strength": self.max_strength,
            "enabled": self.params.enabled,
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "max_strength" | "strength" => {
                self.max_strength = percent_param(name, value)?;
                Ok(())
            }
            "enabled" => set_enabled_param(&mut self.params, value),
            _ => Err(unknown_param(name, "noise")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::random::{RngSource, SequenceSource};
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_strength_is_passthrough() {
        let mut buffer = PixelBuffer::filled(5, 5, Rgb::new(0.2, 0.4, 0.6)).unwrap();
        let original = buffer.clone();
        let mut rng = RngSource::seeded(1);
        Noise::new(0).apply(&mut buffer, &mut rng);
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let base = PixelBuffer::filled(16, 16, Rgb::new(0.5, 0.25, 0.75)).unwrap();

        let mut a = base.clone();
        Noise::new(40).apply(&mut a, &mut RngSource::seeded(99));
        let mut b = base.clone();
        Noise::new(40).apply(&mut b, &mut RngSource::seeded(99));

        assert_eq!(a, b);
        assert_ne!(a, base);
    }

    #[test]
    fn test_blend_direction_follows_parity() {
        let mut buffer = PixelBuffer::filled(2, 1, Rgb::new(0.5, 0.5, 0.5)).unwrap();
        // pixel 0: s=50, p=2 (even -> black); pixel 1: s=50, p=3 (odd -> white)
        let mut rng = SequenceSource::new(vec![50, 2, 50, 3]);
        Noise::new(100).apply(&mut buffer, &mut rng);

        assert_relative_eq!(buffer.get(0, 0).unwrap().r, 0.25);
        assert_relative_eq!(buffer.get(1, 0).unwrap().r, 0.75);
    }

    #[test]
    fn test_noise_stays_in_range() {
        let mut buffer = PixelBuffer::filled(8, 8, Rgb::new(1.0, 0.0, 0.5)).unwrap();
        Noise::new(100).apply(&mut buffer, &mut RngSource::seeded(5));
        assert!(buffer.is_in_range());
    }

    #[test]
    fn test_set_param() {
        let mut noise = Noise::new(10);
        noise.set_param("max_strength", &json!(25)).unwrap();
        assert_eq!(noise.max_strength(), 25);
        assert!(noise.set_param("max_strength", &json!(true)).is_err());
        assert_eq!(noise.get_params()["max_strength"], json!(25));
    }
}
