//! Built-in scene
//!
//! Flat-shaded render sources and an in-memory registry, used by the CLI
//! and tests in place of a host engine.

mod flat;
mod registry;

pub use flat::{FlatSource, Paint, Primitive, Shape, REFERENCE_FOV};
pub use registry::{StaticRegistry, DEFAULT_MOUNT_NAME};
