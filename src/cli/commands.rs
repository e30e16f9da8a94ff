//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::info;

use crate::effects::{RandomSource, RngSource};
use crate::error::{CaptureError, Result};
use crate::pipeline::{
    list_captures, CaptureConfig, CapturePipeline, CaptureType, DirectorySink, MemorySink,
};
use crate::raster::Rgb;
use crate::scene::StaticRegistry;

/// Load the configuration file, or defaults when none was given.
pub fn load_config(path: Option<&Path>) -> Result<CaptureConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration: {}", path.display());
            CaptureConfig::load(path)
        }
        None => Ok(CaptureConfig::default()),
    }
}

/// Seeded source when a seed is given, OS entropy otherwise.
pub fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(RngSource::seeded(seed)),
        None => Box::new(RngSource::from_entropy()),
    }
}

/// Take one capture of the demo scene and write it to disk.
pub fn capture(
    mut config: CaptureConfig,
    capture_type: &str,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let capture_type: CaptureType = capture_type.parse()?;
    if let Some(dir) = output {
        config.output_dir = dir.to_path_buf();
    }
    info!(
        "Capturing {} at {}x{}",
        capture_type, config.horizontal_resolution, config.vertical_resolution
    );

    let sink = DirectorySink::new(&config.output_dir, &config.file_prefix);
    let registry = StaticRegistry::demo();
    let mut pipeline = CapturePipeline::setup(config, &registry, sink, random_source(seed));

    if !pipeline.config().camera_type.supports(capture_type) {
        println!(
            "Note: {} cameras do not offer {} captures",
            pipeline.config().camera_type,
            capture_type
        );
    }

    let receipt = pipeline.try_capture(capture_type)?;

    match &receipt.path {
        Some(path) => println!("Saved: {}", path.display()),
        None => println!("Captured {} bytes", receipt.bytes),
    }
    println!("Resolution: {}x{}", receipt.width, receipt.height);
    if receipt.effects.is_empty() {
        println!("Effects: none");
    } else {
        println!("Effects: {}", receipt.effects.join(" -> "));
    }
    println!("SHA-256: {}", receipt.checksum);

    Ok(())
}

/// Run the preview tick against the demo scene and summarize the raster.
pub fn preview(config: CaptureConfig, frames: u32, seed: Option<u64>) -> Result<()> {
    let registry = StaticRegistry::demo();
    let mut pipeline =
        CapturePipeline::setup(config, &registry, MemorySink::new(), random_source(seed));

    pipeline.open_preview()?;
    let mut refreshed = 0;
    for _ in 0..frames {
        if pipeline.preview_capture() {
            refreshed += 1;
        }
    }

    let Some(raster) = pipeline.preview_raster() else {
        println!("No preview frame rendered.");
        return Ok(());
    };

    let count = raster.len().max(1) as f32;
    let sum = raster.pixels().iter().fold(Rgb::BLACK, |acc, p| {
        Rgb::new(acc.r + p.r, acc.g + p.g, acc.b + p.b)
    });
    let mean = Rgb::new(sum.r / count, sum.g / count, sum.b / count);

    println!("Preview: {}x{}", raster.width(), raster.height());
    println!("Frames rendered: {}/{}", refreshed, frames);
    println!(
        "Mean colour: ({:.3}, {:.3}, {:.3}), luminance {:.3}",
        mean.r,
        mean.g,
        mean.b,
        mean.luminance()
    );

    pipeline.close_preview();
    Ok(())
}

/// List captures in the output directory.
pub fn list(config: &CaptureConfig, output: Option<&Path>) -> Result<()> {
    let dir = output.unwrap_or(config.output_dir.as_path());
    let captures = list_captures(dir, &config.file_prefix)?;

    if captures.is_empty() {
        println!("No captures in {}", dir.display());
        return Ok(());
    }

    println!("Captures in {}:", dir.display());
    println!("{:-<60}", "");
    for path in &captures {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!("  {} ({} bytes)", name, size);
    }
    println!("{:-<60}", "");
    println!("Total: {}", captures.len());

    Ok(())
}

/// Write the default configuration.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CaptureError::InvalidConfig {
            reason: format!("{} already exists (use --force to overwrite)", path.display()),
        });
    }

    CaptureConfig::default().save(path)?;
    println!("Configuration written: {}", path.display());

    Ok(())
}

/// Print every capture type, marking those the configured camera offers.
pub fn types(config: &CaptureConfig) -> Result<()> {
    println!("Camera type: {}", config.camera_type);
    for capture_type in CaptureType::ALL {
        let marker = if config.camera_type.supports(capture_type) {
            "*"
        } else {
            " "
        };
        println!("  {} {:<20} {}", marker, capture_type.tag(), capture_type.label());
    }

    Ok(())
}
