//! Image Effects Library
//!
//! Post-capture pixel transforms. All effects implement the `Effect` trait
//! and run per pixel with no neighbourhood access.

mod chain;
mod channel;
mod damage;
mod effect;
mod noise;
mod random;
mod spectral;

pub use chain::{selector_effect, EffectChain, EffectOrder, EffectStage};
pub use channel::{Channel, ChannelMask, Greyscale};
pub use damage::{DamagePolicy, ErrorDamage, DAMAGE_BOOST_FACTOR, DAMAGE_DIM_FACTOR};
pub use effect::{clamp_percent, Effect, EffectParams};
pub use noise::Noise;
pub use random::{RandomSource, RngSource, SequenceSource};
pub use spectral::{SpectralBand, SpectralShift};
