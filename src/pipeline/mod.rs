//! Capture pipeline
//!
//! - Capture and camera type selectors
//! - JSON configuration
//! - Image sinks
//! - The capture/preview entry points

mod capture;
mod config;
mod request;
mod sink;

pub use capture::{CapturePipeline, CaptureReceipt};
pub use config::{
    CaptureConfig, ErrorSettings, NoiseSettings, DEFAULT_FIELD_OF_VIEW,
    DEFAULT_PREVIEW_RESOLUTION, DEFAULT_RESOLUTION,
};
pub use request::{CameraType, CaptureRequest, CaptureType};
pub use sink::{list_captures, DirectorySink, ImageSink, MemorySink, SinkReceipt, CAPTURE_EXTENSION};
