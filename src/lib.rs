//! Neptune Camera - Composite Capture Pipeline
//!
//! Renders a scene through four cooperating camera layers into one shared
//! color/depth target, runs the result through a simulated sensor effect
//! chain and hands PNG bytes to a sink.
//!
//! # Architecture
//!
//! - `compositor`: layered render protocol over the galaxy, scaled, far and
//!   near cameras, drawn back to front with no clears in between
//! - `effects`: per-pixel damage, channel selector and noise transforms
//! - `pipeline`: configuration, capture/preview entry points and sinks
//! - `raster`: pixel buffers and PNG encoding
//! - `scene`: flat-shaded built-in scene used without a host engine

pub mod cli;
pub mod compositor;
pub mod effects;
pub mod error;
pub mod pipeline;
pub mod raster;
pub mod scene;

pub use error::{CaptureError, CaptureStage, Result};
pub use pipeline::{CaptureConfig, CapturePipeline, CaptureReceipt, CaptureType};
