//! Channel isolation
//!
//! Keeps a single colour channel and zeroes the other two, the way a
//! filtered single-band sensor would see the scene.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::effects::effect::{set_enabled_param, unknown_param, Effect, EffectParams};
use crate::effects::random::RandomSource;
use crate::error::Result;
use crate::impl_effect_common;
use crate::raster::{PixelBuffer, Rgb};

/// Colour channel kept by a `ChannelMask`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Project a sample onto this channel
    #[inline]
    pub fn isolate(self, c: Rgb) -> Rgb {
        match self {
            Channel::Red => Rgb::new(c.r, 0.0, 0.0),
            Channel::Green => Rgb::new(0.0, c.g, 0.0),
            Channel::Blue => Rgb::new(0.0, 0.0, c.b),
        }
    }
}

/// Single-channel isolation effect
///
/// Applying the same mask twice is the same as applying it once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMask {
    params: EffectParams,
    channel: Channel,
}

impl ChannelMask {
    pub fn new(channel: Channel) -> Self {
        Self {
            params: EffectParams::default(),
            channel,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }
}

impl Effect for ChannelMask {
    fn effect_type(&self) -> &'static str {
        match self.channel {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }

    fn display_name(&self) -> &str {
        match self.channel {
            Channel::Red => "Red Channel",
            Channel::Green => "Green Channel",
            Channel::Blue => "Blue Channel",
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
        let channel = self.channel;
        buffer.map_in_place(|c| channel.isolate(c));
    }

    fn get_params(&self) -> Value {
        json!({
            "channel": self.channel,
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

/// Greyscale conversion using Rec. 601 luminance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Greyscale {
    params: EffectParams,
}

impl Greyscale {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for Greyscale {
    impl_effect_common!(Greyscale, "greyscale", "Greyscale");

    fn apply(&mut self, buffer: &mut PixelBuffer, _rng: &mut dyn RandomSource) {
        if !self.params.enabled {
            return;
        }
        buffer.map_in_place(|c| {
            let l = c.luminance();
            Rgb::new(l, l, l)
        });
    }

    fn get_params(&self) -> Value {
        json!({ "enabled": self.params.enabled })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "enabled" => set_enabled_param(&mut self.params, value),
            _ => Err(unknown_param(name, "greyscale")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::random::SequenceSource;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn sample_buffer() -> PixelBuffer {
        let mut buffer = PixelBuffer::filled(3, 3, Rgb::new(0.8, 0.6, 0.4)).unwrap();
        buffer.set(1, 1, Rgb::new(0.1, 0.9, 0.3));
        buffer.set(2, 0, Rgb::new(1.4, -0.2, 0.7));
        buffer
    }

    #[test_case(Channel::Red, Rgb::new(0.8, 0.0, 0.0) ; "red")]
    #[test_case(Channel::Green, Rgb::new(0.0, 0.6, 0.0) ; "green")]
    #[test_case(Channel::Blue, Rgb::new(0.0, 0.0, 0.4) ; "blue")]
    fn test_channel_isolation(channel: Channel, expected: Rgb) {
        let mut buffer = PixelBuffer::filled(2, 2, Rgb::new(0.8, 0.6, 0.4)).unwrap();
        ChannelMask::new(channel).apply(&mut buffer, &mut SequenceSource::default());
        assert!(buffer.pixels().iter().all(|p| *p == expected));
    }

    #[test_case(Channel::Red ; "red")]
    #[test_case(Channel::Green ; "green")]
    #[test_case(Channel::Blue ; "blue")]
    fn test_channel_isolation_is_idempotent(channel: Channel) {
        let mut rng = SequenceSource::default();
        let mut once = sample_buffer();
        ChannelMask::new(channel).apply(&mut once, &mut rng);

        let mut twice = once.clone();
        ChannelMask::new(channel).apply(&mut twice, &mut rng);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_greyscale_equal_channels() {
        let mut buffer = sample_buffer();
        Greyscale::new().apply(&mut buffer, &mut SequenceSource::default());
        for p in buffer.pixels() {
            assert_eq!(p.r, p.g);
            assert_eq!(p.g, p.b);
        }
    }

    #[test]
    fn test_greyscale_pure_red() {
        let mut buffer = PixelBuffer::filled(1, 1, Rgb::new(1.0, 0.0, 0.0)).unwrap();
        Greyscale::new().apply(&mut buffer, &mut SequenceSource::default());
        let p = buffer.get(0, 0).unwrap();
        assert_relative_eq!(p.r, 0.299);
        assert_relative_eq!(p.b, 0.299);
    }

    #[test]
    fn test_disabled_mask_is_passthrough() {
        let mut buffer = sample_buffer();
        let original = buffer.clone();
        let mut mask = ChannelMask::new(Channel::Red);
        mask.set_param("enabled", &json!(false)).unwrap();
        mask.apply(&mut buffer, &mut SequenceSource::default());
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_effect_types() {
        assert_eq!(ChannelMask::new(Channel::Green).effect_type(), "green");
        assert_eq!(Greyscale::new().effect_type(), "greyscale");
        assert!(Greyscale::new().set_param("strength", &json!(1)).is_err());
    }
}
