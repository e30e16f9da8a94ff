//! Render source capability
//!
//! The host engine's cameras sit behind `RenderSource`. The compositor only
//! ever talks to this trait, so any engine binding (or the flat-shaded demo
//! scene) can be swapped in.

use crate::compositor::layer::CameraDescriptor;
use crate::compositor::target::RenderTarget;
use crate::error::Result;

/// A camera that draws its own objects into a shared target
pub trait RenderSource {
    /// Apply lens and hierarchy settings
    fn configure(&mut self, descriptor: &CameraDescriptor);

    /// Point the camera's color and depth output at `target`
    fn bind_target(&mut self, target: u64);

    /// Detach from any target
    fn unbind_target(&mut self);

    /// Target currently bound, if any
    fn bound_target(&self) -> Option<u64>;

    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Draw into `target` without clearing it
    ///
    /// Implementations depth-test against what earlier layers left behind.
    fn render(&mut self, target: &mut RenderTarget) -> Result<()>;
}
