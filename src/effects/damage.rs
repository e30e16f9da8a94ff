//! Transmission error damage
//!
//! Each pixel rolls a number in 0..100. When the roll is at or below the
//! error rate the pixel is corrupted; the parity of the roll picks which way.
//! A rate of 0 disables the effect entirely.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::effects::effect::{
    clamp_percent, invalid_param, percent_param, set_enabled_param, unknown_param, Effect,
    EffectParams,
};
use crate::effects::random::RandomSource;
use crate::error::Result;
use crate::impl_effect_common;
use crate::raster::{PixelBuffer, Rgb};

/// Channel factor for an even roll under `DamagePolicy::Scale`
pub const DAMAGE_DIM_FACTOR: f32 = 0.1;

/// Channel factor for an odd roll under `DamagePolicy::Scale`
pub const DAMAGE_BOOST_FACTOR: f32 = 2.0;

/// How a damaged pixel is corrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamagePolicy {
    /// Multiply channels by 0.1 (even roll) or 2.0 (odd roll), each clamped to 1.0
    #[default]
    Scale,
    /// Replace with white (even roll) or black (odd roll)
    Replace,
}

impl DamagePolicy {
    #[inline]
    pub fn corrupt(self, c: Rgb, roll: u32) -> Rgb {
        let even = roll % 2 == 0;
        match self {
            DamagePolicy::Scale => {
                let factor = if even {
                    DAMAGE_DIM_FACTOR
                } else {
                    DAMAGE_BOOST_FACTOR
                };
                let s = c.scaled(factor);
                Rgb::new(s.r.min(1.0), s.g.min(1.0), s.b.min(1.0))
            }
            DamagePolicy::Replace => {
                if even {
                    Rgb::WHITE
                } else {
                    Rgb::BLACK
                }
            }
        }
    }
}

/// Probabilistic per-pixel corruption
///
/// # Parameters
/// - `rate`: 0..=100, chance per pixel (roll <= rate corrupts)
/// - `policy`: `scale` or `replace`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDamage {
    params: EffectParams,
    rate: u8,
    policy: DamagePolicy,
}

impl ErrorDamage {
    /// Create a damage effect; `rate` is clamped to 0..=100
    pub fn new(rate: i64, policy: DamagePolicy) -> Self {
        Self {
            params: EffectParams::default(),
            rate: clamp_percent(rate),
            policy,
        }
    }

    pub fn rate(&self) -> u8 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: i64) {
        self.rate = clamp_percent(rate);
    }

    pub fn policy(&self) -> DamagePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: DamagePolicy) {
        self.policy = policy;
    }
}

impl Effect for ErrorDamage {
    impl_effect_common!(ErrorDamage, "error_damage", "Error Damage");

    fn apply(&mut self, buffer: &mut PixelBuffer, rng: &mut dyn RandomSource) {
        if !self.params.enabled || self.rate == 0 {
            return;
        }
        let rate = u32::from(self.rate);
        let policy = self.policy;
        for pixel in buffer.pixels_mut() {
            let roll = rng.next_below(100);
            if roll <= rate {
                *pixel = policy.corrupt(*pixel, roll);
            }
        }
    }

    fn get_params(&self) -> Value {
        json!({
            "rate": self.rate,
            "policy": self.policy,
            "enabled": self.params.enabled,
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "rate" => {
                self.rate = percent_param(name, value)?;
                Ok(())
            }
            "policy" => {
                self.policy = serde_json::from_value(value.clone())
                    .map_err(|_| invalid_param(name, value, "expected \"scale\" or \"replace\""))?;
                Ok(())
            }
            "enabled" => set_enabled_param(&mut self.params, value),
            _ => Err(unknown_param(name, "error_damage")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::random::{RngSource, SequenceSource};
    use approx::assert_relative_eq;

    fn gradient() -> PixelBuffer {
        let mut buffer = PixelBuffer::new(8, 8).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                buffer.set(x, y, Rgb::new(x as f32 / 8.0, y as f32 / 8.0, 0.3));
            }
        }
        buffer
    }

    #[test]
    fn test_rate_zero_touches_nothing() {
        let mut buffer = gradient();
        let original = buffer.clone();
        // A roll of 0 would pass `roll <= rate`; the effect must still skip.
        let mut rng = SequenceSource::constant(0);
        ErrorDamage::new(0, DamagePolicy::Replace).apply(&mut buffer, &mut rng);
        assert_eq!(buffer, original);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_rate_hundred_scales_every_pixel() {
        let mut buffer = PixelBuffer::filled(4, 4, Rgb::new(0.4, 0.6, 0.2)).unwrap();
        let mut rng = RngSource::seeded(3);
        ErrorDamage::new(100, DamagePolicy::Scale).apply(&mut buffer, &mut rng);

        for p in buffer.pixels() {
            let dimmed = (p.r - 0.04).abs() < 1e-6;
            let boosted = (p.r - 0.8).abs() < 1e-6 && p.g == 1.0;
            assert!(dimmed || boosted, "pixel untouched: {:?}", p);
        }
    }

    #[test]
    fn test_scale_policy_parity() {
        let c = Rgb::new(0.3, 0.7, 0.5);
        let dim = DamagePolicy::Scale.corrupt(c, 4);
        assert_relative_eq!(dim.g, 0.07, epsilon = 1e-6);

        let boost = DamagePolicy::Scale.corrupt(c, 5);
        assert_relative_eq!(boost.r, 0.6, epsilon = 1e-6);
        assert_eq!(boost.g, 1.0);
        assert_eq!(boost.b, 1.0);
    }

    #[test]
    fn test_replace_policy_parity() {
        let c = Rgb::new(0.3, 0.7, 0.5);
        assert_eq!(DamagePolicy::Replace.corrupt(c, 2), Rgb::WHITE);
        assert_eq!(DamagePolicy::Replace.corrupt(c, 3), Rgb::BLACK);
    }

    #[test]
    fn test_roll_above_rate_is_spared() {
        let mut buffer = PixelBuffer::filled(2, 1, Rgb::new(0.5, 0.5, 0.5)).unwrap();
        // First pixel rolls 11 (> 10), second rolls 10 (<= 10, even -> dim)
        let mut rng = SequenceSource::new(vec![11, 10]);
        ErrorDamage::new(10, DamagePolicy::Scale).apply(&mut buffer, &mut rng);
        assert_eq!(buffer.get(0, 0), Some(Rgb::new(0.5, 0.5, 0.5)));
        assert_relative_eq!(buffer.get(1, 0).unwrap().r, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_rate_is_clamped() {
        assert_eq!(ErrorDamage::new(-20, DamagePolicy::Scale).rate(), 0);
        assert_eq!(ErrorDamage::new(400, DamagePolicy::Scale).rate(), 100);
    }

    #[test]
    fn test_set_param_policy() {
        let mut damage = ErrorDamage::new(5, DamagePolicy::Scale);
        damage.set_param("policy", &json!("replace")).unwrap();
        assert_eq!(damage.policy(), DamagePolicy::Replace);
        assert!(damage.set_param("policy", &json!("melt")).is_err());
        damage.set_param("rate", &json!(-3)).unwrap();
        assert_eq!(damage.rate(), 0);
    }
}
