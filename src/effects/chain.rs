//! Effect Chain management
//!
//! Effects run in chain order (index 0 first). The canonical order is:
//! 1. Error damage
//! 2. Selector transform (channel, greyscale or spectral)
//! 3. Noise
//!
//! The legacy order (selector, noise, damage) is kept for parts configured
//! against the older behaviour.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    Channel, ChannelMask, Effect, ErrorDamage, Greyscale, Noise, RandomSource, SpectralShift,
};
use crate::error::{CaptureError, Result};
use crate::pipeline::{CaptureRequest, CaptureType};
use crate::raster::PixelBuffer;

/// Ordering policy for the add-on stages relative to the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectOrder {
    /// damage -> selector -> noise
    #[default]
    Canonical,
    /// selector -> noise -> damage
    Legacy,
}

/// Role of an effect within the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EffectStage {
    Damage,
    Selector,
    Noise,
}

impl EffectStage {
    /// Stage of an effect type identifier
    pub fn for_effect_type(effect_type: &str) -> Self {
        match effect_type {
            "error_damage" => EffectStage::Damage,
            "noise" => EffectStage::Noise,
            _ => EffectStage::Selector,
        }
    }

    /// Position of this stage under `order` (lower = earlier)
    pub fn priority(self, order: EffectOrder) -> u32 {
        match (order, self) {
            (EffectOrder::Canonical, EffectStage::Damage) => 0,
            (EffectOrder::Canonical, EffectStage::Selector) => 1,
            (EffectOrder::Canonical, EffectStage::Noise) => 2,
            (EffectOrder::Legacy, EffectStage::Selector) => 0,
            (EffectOrder::Legacy, EffectStage::Noise) => 1,
            (EffectOrder::Legacy, EffectStage::Damage) => 2,
        }
    }
}

/// Selector effect for a capture type; `None` for full colour
pub fn selector_effect(capture_type: CaptureType) -> Option<Box<dyn Effect>> {
    match capture_type {
        CaptureType::FullColour => None,
        CaptureType::Red => Some(Box::new(ChannelMask::new(Channel::Red))),
        CaptureType::Green => Some(Box::new(ChannelMask::new(Channel::Green))),
        CaptureType::Blue => Some(Box::new(ChannelMask::new(Channel::Blue))),
        CaptureType::Greyscale => Some(Box::new(Greyscale::new())),
        CaptureType::Ultraviolet => Some(Box::new(SpectralShift::ultraviolet())),
        CaptureType::Infrared => Some(Box::new(SpectralShift::infrared())),
    }
}

/// Ordered chain of effects
pub struct EffectChain {
    effects: Vec<Box<dyn Effect>>,
    order: EffectOrder,
}

impl EffectChain {
    /// Create a new empty effect chain
    pub fn new(order: EffectOrder) -> Self {
        Self {
            effects: Vec::new(),
            order,
        }
    }

    /// Build the chain a capture request asks for
    pub fn for_request(request: &CaptureRequest) -> Self {
        let mut chain = Self::new(request.effect_order);
        if let Some(rate) = request.damage {
            chain.add(Box::new(ErrorDamage::new(
                i64::from(rate),
                request.damage_policy,
            )));
        }
        if let Some(selector) = selector_effect(request.capture_type) {
            chain.add(selector);
        }
        if let Some(max_strength) = request.noise {
            chain.add(Box::new(Noise::new(i64::from(max_strength))));
        }
        chain
    }

    pub fn order(&self) -> EffectOrder {
        self.order
    }

    /// Add an effect at the position its stage belongs to
    ///
    /// Effects of the same stage keep insertion order.
    pub fn add(&mut self, effect: Box<dyn Effect>) {
        let position = self.get_recommended_position(effect.effect_type());
        self.effects.insert(position, effect);
    }

    /// Remove an effect by ID
    pub fn remove(&mut self, effect_id: &str) -> Result<Box<dyn Effect>> {
        let index = self
            .effects
            .iter()
            .position(|e| e.id() == effect_id)
            .ok_or_else(|| CaptureError::InvalidParameter {
                name: effect_id.to_string(),
                reason: "no effect with this id in the chain".to_string(),
            })?;

        Ok(self.effects.remove(index))
    }

    /// Get a reference to an effect by ID
    pub fn get(&self, effect_id: &str) -> Option<&dyn Effect> {
        self.effects
            .iter()
            .find(|e| e.id() == effect_id)
            .map(|e| e.as_ref())
    }

    /// Get a mutable reference to an effect by ID
    pub fn get_mut(&mut self, effect_id: &str) -> Option<&mut (dyn Effect + 'static)> {
        for effect in &mut self.effects {
            if effect.id() == effect_id {
                return Some(effect.as_mut());
            }
        }
        None
    }

    /// Run every enabled effect in order, then clamp the result to 0..=1
    pub fn apply(&mut self, buffer: &mut PixelBuffer, rng: &mut dyn RandomSource) {
        for effect in &mut self.effects {
            if !effect.is_enabled() {
                continue;
            }
            debug!("[effects] applying {}", effect.display_name());
            effect.apply(buffer, rng);
        }
        buffer.clamp();
    }

    /// Get the number of effects in the chain
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Iterate over effects
    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(|e| e.as_ref())
    }

    /// Effect type identifiers in chain order
    pub fn effect_types(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.effect_type()).collect()
    }

    fn get_recommended_position(&self, effect_type: &str) -> usize {
        let priority = EffectStage::for_effect_type(effect_type).priority(self.order);

        for (i, effect) in self.effects.iter().enumerate() {
            let existing = EffectStage::for_effect_type(effect.effect_type()).priority(self.order);
            if existing > priority {
                return i;
            }
        }

        self.effects.len()
    }

    /// Describe the chain as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let effects: Vec<serde_json::Value> = self
            .effects
            .iter()
            .map(|e| {
                serde_json::json!({
                    "type": e.effect_type(),
                    "id": e.id(),
                    "params": e.get_params(),
                })
            })
            .collect();

        serde_json::json!({
            "order": self.order,
            "effects": effects,
        })
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new(EffectOrder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{DamagePolicy, RngSource, SequenceSource};
    use crate::raster::Rgb;

    #[test]
    fn test_stage_priorities() {
        assert!(
            EffectStage::Damage.priority(EffectOrder::Canonical)
                < EffectStage::Selector.priority(EffectOrder::Canonical)
        );
        assert!(
            EffectStage::Noise.priority(EffectOrder::Legacy)
                < EffectStage::Damage.priority(EffectOrder::Legacy)
        );
    }

    #[test]
    fn test_chain_new() {
        let chain = EffectChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
    }

    #[test]
    fn test_canonical_order_from_request() {
        let request = CaptureRequest::plain(CaptureType::Red, 4, 4)
            .with_noise(10)
            .with_damage(5);
        let chain = EffectChain::for_request(&request);
        assert_eq!(chain.effect_types(), vec!["error_damage", "red", "noise"]);
    }

    #[test]
    fn test_legacy_order_from_request() {
        let mut request = CaptureRequest::plain(CaptureType::Greyscale, 4, 4)
            .with_damage(5)
            .with_noise(10);
        request.effect_order = EffectOrder::Legacy;
        let chain = EffectChain::for_request(&request);
        assert_eq!(chain.effect_types(), vec!["greyscale", "noise", "error_damage"]);
    }

    #[test]
    fn test_full_colour_without_addons_is_empty() {
        let chain = EffectChain::for_request(&CaptureRequest::plain(CaptureType::FullColour, 2, 2));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_order_changes_outcome() {
        // Damage with the replace policy writes white; a red mask applied
        // afterwards leaves (1, 0, 0), applied before leaves (1, 1, 1).
        let base = PixelBuffer::filled(1, 1, Rgb::new(0.2, 0.4, 0.6)).unwrap();
        let mut request = CaptureRequest::plain(CaptureType::Red, 1, 1).with_damage(100);
        request.damage_policy = DamagePolicy::Replace;

        let mut canonical = base.clone();
        EffectChain::for_request(&request).apply(&mut canonical, &mut SequenceSource::constant(0));
        assert_eq!(canonical.get(0, 0), Some(Rgb::new(1.0, 0.0, 0.0)));

        request.effect_order = EffectOrder::Legacy;
        let mut legacy = base.clone();
        EffectChain::for_request(&request).apply(&mut legacy, &mut SequenceSource::constant(0));
        assert_eq!(legacy.get(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn test_apply_clamps() {
        let mut buffer = PixelBuffer::filled(2, 2, Rgb::new(1.5, -0.5, 0.5)).unwrap();
        EffectChain::default().apply(&mut buffer, &mut RngSource::seeded(0));
        assert!(buffer.is_in_range());
    }

    #[test]
    fn test_remove_and_get() {
        let mut chain = EffectChain::default();
        let noise = Noise::new(10);
        let id = noise.id().to_string();
        chain.add(Box::new(noise));
        assert!(chain.get(&id).is_some());
        chain.get_mut(&id).unwrap().set_enabled(false);
        assert!(!chain.get(&id).unwrap().is_enabled());
        assert!(chain.remove(&id).is_ok());
        assert!(chain.remove(&id).is_err());
    }

    #[test]
    fn test_to_json_lists_effects() {
        let chain = EffectChain::for_request(&CaptureRequest::plain(CaptureType::Blue, 1, 1).with_noise(3));
        let json = chain.to_json();
        assert_eq!(json["order"], "canonical");
        assert_eq!(json["effects"][0]["type"], "blue");
        assert_eq!(json["effects"][1]["params"]["max_strength"], 3);
    }
}
