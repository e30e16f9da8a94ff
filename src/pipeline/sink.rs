//! Capture sinks
//!
//! A sink takes finished PNG bytes and stores them somewhere. The directory
//! sink never leaves a partial file behind: bytes go to a hidden temporary
//! file first and are renamed into place once complete.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::debug;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{CaptureError, Result};
use crate::raster::EncodedImage;

/// File extension for stored captures
pub const CAPTURE_EXTENSION: &str = ".png";

/// Where a persisted capture ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    /// File path, for sinks that write files
    pub path: Option<PathBuf>,
    pub bytes: usize,
    pub checksum: String,
}

/// Destination for encoded captures
pub trait ImageSink {
    /// Store one encoded image
    fn persist(&mut self, image: &EncodedImage) -> Result<SinkReceipt>;
}

impl<T: ImageSink + ?Sized> ImageSink for Box<T> {
    fn persist(&mut self, image: &EncodedImage) -> Result<SinkReceipt> {
        (**self).persist(image)
    }
}

/// Writes captures as PNG files into one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    prefix: String,
}

impl DirectorySink {
    /// # Arguments
    /// * `dir` - Output directory, created on first write
    /// * `prefix` - File name prefix, e.g. `neptune-image`
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a capture: `<prefix>-<tag>-<YYYYmmdd_HHMMSS>-<uuid>.png`
    pub fn file_name_for(&self, tag: &str) -> String {
        format!(
            "{}-{}-{}-{}{}",
            self.prefix,
            tag,
            Utc::now().format("%Y%m%d_%H%M%S"),
            Uuid::new_v4(),
            CAPTURE_EXTENSION
        )
    }

    /// Captures written with this sink's prefix, sorted by file name
    pub fn list_captures(&self) -> Result<Vec<PathBuf>> {
        list_captures(&self.dir, &self.prefix)
    }
}

impl ImageSink for DirectorySink {
    fn persist(&mut self, image: &EncodedImage) -> Result<SinkReceipt> {
        fs::create_dir_all(&self.dir).map_err(|e| CaptureError::Persist {
            path: self.dir.clone(),
            source: e,
        })?;

        let name = self.file_name_for(&image.tag);
        let final_path = self.dir.join(&name);
        let temp_path = self.dir.join(format!(".{}.tmp", name));

        if let Err(e) = fs::write(&temp_path, &image.bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(CaptureError::Persist {
                path: temp_path,
                source: e,
            });
        }
        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(CaptureError::Persist {
                path: final_path,
                source: e,
            });
        }

        debug!("[sink] wrote {} ({} bytes)", final_path.display(), image.len());
        Ok(SinkReceipt {
            path: Some(final_path),
            bytes: image.len(),
            checksum: image.checksum.clone(),
        })
    }
}

/// List PNG captures in `dir` whose names start with `prefix`
///
/// A missing directory yields an empty list.
pub fn list_captures(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut captures: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.starts_with(prefix) && name.ends_with(CAPTURE_EXTENSION)
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();

    captures.sort();
    Ok(captures)
}

/// Keeps captures in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    images: Vec<EncodedImage>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[EncodedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Most recent capture
    pub fn last(&self) -> Option<&EncodedImage> {
        self.images.last()
    }
}

impl ImageSink for MemorySink {
    fn persist(&mut self, image: &EncodedImage) -> Result<SinkReceipt> {
        self.images.push(image.clone());
        Ok(SinkReceipt {
            path: None,
            bytes: image.len(),
            checksum: image.checksum.clone(),
        })
    }
}
