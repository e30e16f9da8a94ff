//! Error handling for Neptune Camera
//!
//! Every error knows which capture stage it came from so the pipeline
//! boundary can log where a capture died.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::compositor::LayerKind;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Stage of the capture sequence an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureStage {
    /// Camera rig construction from the scene registry
    Setup,
    /// Loading or validating configuration
    Config,
    /// Binding cameras to the shared target
    Bind,
    /// Issuing layer draw calls
    Render,
    /// Copying the color target into a pixel buffer
    ReadBack,
    /// Running the effect chain
    Effects,
    /// PNG encoding
    Encode,
    /// Handing bytes to the sink
    Persist,
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureStage::Setup => "setup",
            CaptureStage::Config => "config",
            CaptureStage::Bind => "bind",
            CaptureStage::Render => "render",
            CaptureStage::ReadBack => "read-back",
            CaptureStage::Effects => "effects",
            CaptureStage::Encode => "encode",
            CaptureStage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Main error type for capture operations
#[derive(Error, Debug)]
pub enum CaptureError {
    // Setup Errors
    #[error("Capture mount '{name}' is missing from the scene")]
    MissingMount { name: String },

    #[error("Scene camera registry supplied no camera descriptors")]
    NoCameraDescriptors,

    #[error("Capture pipeline is inert: {reason}")]
    Inert { reason: String },

    // Config Errors
    #[error("Invalid resolution: {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Unknown capture type: {name}")]
    UnknownCaptureType { name: String },

    #[error("Unknown camera type: {name}")]
    UnknownCameraType { name: String },

    #[error("Invalid effect parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    // Render Errors
    #[error("{layer} layer is bound to target {bound:?}, expected {expected}")]
    TargetMismatch {
        layer: LayerKind,
        bound: Option<u64>,
        expected: u64,
    },

    #[error("{layer} layer failed to render: {reason}")]
    RenderFailed { layer: LayerKind, reason: String },

    #[error("Cannot allocate a {width}x{height} raster")]
    AllocationFailed { width: u32, height: u32 },

    #[error("Read-back failed: {reason}")]
    ReadBack { reason: String },

    // Output Errors
    #[error("Encoding failed: {reason}")]
    Encode {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to write capture: {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CaptureError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            CaptureError::MissingMount { .. } => "MISSING_MOUNT",
            CaptureError::NoCameraDescriptors => "NO_CAMERA_DESCRIPTORS",
            CaptureError::Inert { .. } => "PIPELINE_INERT",
            CaptureError::InvalidResolution { .. } => "INVALID_RESOLUTION",
            CaptureError::InvalidConfig { .. } => "INVALID_CONFIG",
            CaptureError::UnknownCaptureType { .. } => "UNKNOWN_CAPTURE_TYPE",
            CaptureError::UnknownCameraType { .. } => "UNKNOWN_CAMERA_TYPE",
            CaptureError::InvalidParameter { .. } => "INVALID_PARAMETER",
            CaptureError::TargetMismatch { .. } => "TARGET_MISMATCH",
            CaptureError::RenderFailed { .. } => "RENDER_FAILED",
            CaptureError::AllocationFailed { .. } => "ALLOCATION_FAILED",
            CaptureError::ReadBack { .. } => "READ_BACK_FAILED",
            CaptureError::Encode { .. } => "ENCODE_FAILED",
            CaptureError::Persist { .. } => "PERSIST_FAILED",
            CaptureError::Io(_) => "IO_ERROR",
            CaptureError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get the capture stage this error belongs to
    pub fn stage(&self) -> CaptureStage {
        match self {
            CaptureError::MissingMount { .. }
            | CaptureError::NoCameraDescriptors
            | CaptureError::Inert { .. }
            | CaptureError::AllocationFailed { .. } => CaptureStage::Setup,
            CaptureError::InvalidResolution { .. }
            | CaptureError::InvalidConfig { .. }
            | CaptureError::UnknownCaptureType { .. }
            | CaptureError::UnknownCameraType { .. }
            | CaptureError::Serialization(_) => CaptureStage::Config,
            CaptureError::InvalidParameter { .. } => CaptureStage::Effects,
            CaptureError::TargetMismatch { .. } => CaptureStage::Bind,
            CaptureError::RenderFailed { .. } => CaptureStage::Render,
            CaptureError::ReadBack { .. } => CaptureStage::ReadBack,
            CaptureError::Encode { .. } => CaptureStage::Encode,
            CaptureError::Persist { .. } | CaptureError::Io(_) => CaptureStage::Persist,
        }
    }

    /// Check if a retry of the same capture may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CaptureError::RenderFailed { .. }
                | CaptureError::ReadBack { .. }
                | CaptureError::Persist { .. }
                | CaptureError::Io(_)
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CaptureError::MissingMount { .. } => vec![
                "Check the part defines the configured camera transform",
                "Set 'mount_name' in the capture config to the transform's name",
            ],
            CaptureError::NoCameraDescriptors => vec![
                "The scene has no reference cameras yet - wait for the flight scene to load",
                "Verify the reference camera names match the host scene",
            ],
            CaptureError::InvalidResolution { .. } => vec![
                "Resolution must be at least 1x1",
                "The preview resolution must not exceed the capture resolution",
            ],
            CaptureError::AllocationFailed { .. } => vec![
                "Lower the capture or preview resolution",
            ],
            CaptureError::UnknownCaptureType { .. } => vec![
                "Supported types: FULL_COLOUR, RED_COLOUR, GREEN_COLOUR, BLUE_COLOUR, GREYSCALE_COLOUR, ULTRAVIOLET_COLOUR, INFRARED_COLOUR",
            ],
            CaptureError::RenderFailed { .. } | CaptureError::ReadBack { .. } => vec![
                "Try the capture again on the next frame",
                "Lower the capture resolution",
            ],
            CaptureError::Persist { .. } => vec![
                "Free up disk space",
                "Check the output directory is writable",
            ],
            _ => vec![],
        }
    }
}
