//! Pipeline Tests
//!
//! End-to-end captures through the built-in scene: render, effects, PNG
//! encode and sink.

use std::fs;

use approx::assert_abs_diff_eq;
use neptune_camera::compositor::LayerKind;
use neptune_camera::effects::{EffectOrder, RngSource, SequenceSource};
use neptune_camera::pipeline::{
    CaptureConfig, CapturePipeline, CaptureType, DirectorySink, MemorySink,
};
use neptune_camera::raster::{decode_png, PixelBuffer, Rgb};
use neptune_camera::scene::{Primitive, Shape, StaticRegistry, DEFAULT_MOUNT_NAME};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use test_case::test_case;

/// One quantization step of an 8-bit channel
const EPS: f32 = 1.0 / 255.0 + 1e-6;

fn uniform_scene(color: Rgb) -> StaticRegistry {
    StaticRegistry::new()
        .with_mount(DEFAULT_MOUNT_NAME)
        .with_layer(
            LayerKind::Galaxy,
            vec![Primitive::solid(Shape::Fill, color, 1.0)],
        )
}

fn config(width: u32, height: u32) -> CaptureConfig {
    let mut config = CaptureConfig::default();
    config.horizontal_resolution = width;
    config.vertical_resolution = height;
    config.preview_horizontal_resolution = width;
    config.preview_vertical_resolution = height;
    config.errors.enabled = false;
    config.noise.enabled = false;
    config
}

fn memory_pipeline(config: CaptureConfig, registry: &StaticRegistry) -> CapturePipeline<MemorySink> {
    CapturePipeline::setup(
        config,
        registry,
        MemorySink::new(),
        Box::new(SequenceSource::constant(0)),
    )
}

fn last_capture(pipeline: &CapturePipeline<MemorySink>) -> PixelBuffer {
    let image = pipeline.sink().last().expect("no capture stored");
    decode_png(&image.bytes).unwrap()
}

fn assert_uniform(buffer: &PixelBuffer, expected: Rgb) {
    for pixel in buffer.pixels() {
        assert_abs_diff_eq!(pixel.r, expected.r, epsilon = EPS);
        assert_abs_diff_eq!(pixel.g, expected.g, epsilon = EPS);
        assert_abs_diff_eq!(pixel.b, expected.b, epsilon = EPS);
    }
}

// === Selector Tests ===

#[test]
fn test_red_capture_of_uniform_scene() {
    let registry = uniform_scene(Rgb::new(0.8, 0.6, 0.4));
    let mut pipeline = memory_pipeline(config(4, 4), &registry);

    let receipt = pipeline.capture(CaptureType::Red).unwrap();
    assert_eq!(receipt.effects, vec!["red"]);

    let buffer = last_capture(&pipeline);
    assert_eq!((buffer.width(), buffer.height()), (4, 4));
    assert_uniform(&buffer, Rgb::new(0.8, 0.0, 0.0));
}

#[test]
fn test_greyscale_of_pure_red() {
    let registry = uniform_scene(Rgb::new(1.0, 0.0, 0.0));
    let mut pipeline = memory_pipeline(config(1, 1), &registry);

    pipeline.capture(CaptureType::Greyscale).unwrap();

    let buffer = last_capture(&pipeline);
    assert_uniform(&buffer, Rgb::new(0.299, 0.299, 0.299));
}

#[test_case(CaptureType::FullColour, Rgb::new(0.8, 0.6, 0.4) ; "full colour")]
#[test_case(CaptureType::Red, Rgb::new(0.8, 0.0, 0.0) ; "red")]
#[test_case(CaptureType::Green, Rgb::new(0.0, 0.6, 0.0) ; "green")]
#[test_case(CaptureType::Blue, Rgb::new(0.0, 0.0, 0.4) ; "blue")]
#[test_case(CaptureType::Ultraviolet, Rgb::new(0.6, 0.6, 0.4) ; "ultraviolet")]
#[test_case(CaptureType::Infrared, Rgb::new(0.8, 0.6, 0.6) ; "infrared")]
fn test_selector_output(capture_type: CaptureType, expected: Rgb) {
    let registry = uniform_scene(Rgb::new(0.8, 0.6, 0.4));
    let mut pipeline = memory_pipeline(config(3, 2), &registry);

    let receipt = pipeline.capture(capture_type).unwrap();
    assert_eq!(receipt.capture_type, capture_type);
    assert_eq!(pipeline.sink().last().unwrap().tag, capture_type.tag());
    assert_uniform(&last_capture(&pipeline), expected);
}

// === Effect Chain Tests ===

#[test]
fn test_canonical_effect_order() {
    let mut config = config(8, 8);
    config.errors.enabled = true;
    config.noise.enabled = true;
    let mut pipeline = memory_pipeline(config, &StaticRegistry::demo());

    let receipt = pipeline.capture(CaptureType::Blue).unwrap();
    assert_eq!(receipt.effects, vec!["error_damage", "blue", "noise"]);
}

#[test]
fn test_legacy_effect_order() {
    let mut config = config(8, 8);
    config.errors.enabled = true;
    config.noise.enabled = true;
    config.effect_order = EffectOrder::Legacy;
    let mut pipeline = memory_pipeline(config, &StaticRegistry::demo());

    let receipt = pipeline.capture(CaptureType::Blue).unwrap();
    assert_eq!(receipt.effects, vec!["blue", "noise", "error_damage"]);
}

#[test]
fn test_full_effects_keep_resolution() {
    let mut config = config(32, 24);
    config.errors.enabled = true;
    config.errors.rate = 100;
    config.noise.enabled = true;
    config.noise.max_strength = 100;
    let mut pipeline = CapturePipeline::setup(
        config,
        &StaticRegistry::demo(),
        MemorySink::new(),
        Box::new(RngSource::seeded(7)),
    );

    let receipt = pipeline.capture(CaptureType::FullColour).unwrap();
    let buffer = last_capture(&pipeline);

    assert_eq!((receipt.width, receipt.height), (32, 24));
    assert_eq!((buffer.width(), buffer.height()), (32, 24));
    assert!(buffer.is_in_range());
}

#[test]
fn test_seeded_captures_are_reproducible() {
    let mut config = config(16, 16);
    config.errors.enabled = true;
    config.errors.rate = 30;
    config.noise.enabled = true;

    let checksum = |seed: u64| {
        let mut pipeline = CapturePipeline::setup(
            config.clone(),
            &StaticRegistry::demo(),
            MemorySink::new(),
            Box::new(RngSource::seeded(seed)),
        );
        pipeline.capture(CaptureType::FullColour).unwrap().checksum
    };

    assert_eq!(checksum(42), checksum(42));
}

// === Failure Tests ===

#[test]
fn test_zero_descriptors_returns_none() {
    let registry = StaticRegistry::new().with_mount(DEFAULT_MOUNT_NAME);
    let mut pipeline = memory_pipeline(config(4, 4), &registry);

    assert!(pipeline.is_inert());
    assert!(pipeline.capture(CaptureType::FullColour).is_none());
    assert!(!pipeline.preview_capture());
    assert!(pipeline.sink().is_empty());

    let err = pipeline.try_capture(CaptureType::Red).unwrap_err();
    assert_eq!(err.error_code(), "PIPELINE_INERT");
}

#[test]
fn test_oversized_resolution_leaves_pipeline_inert() {
    let mut config = config(1, 1);
    config.horizontal_resolution = u32::MAX;
    config.vertical_resolution = u32::MAX;
    let mut pipeline = memory_pipeline(config, &StaticRegistry::demo());

    assert!(pipeline.is_inert());
    assert!(pipeline.capture(CaptureType::Red).is_none());
    assert!(pipeline.sink().is_empty());
}

#[test]
fn test_no_file_when_sink_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("Screenshots");
    fs::write(&blocker, b"occupied").unwrap();

    let mut pipeline = CapturePipeline::setup(
        config(4, 4),
        &StaticRegistry::demo(),
        DirectorySink::new(&blocker, "neptune-image"),
        Box::new(SequenceSource::constant(0)),
    );

    assert!(pipeline.capture(CaptureType::Green).is_none());
    assert!(!pipeline.compositor().unwrap().any_enabled());

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_layers_disabled_after_capture() {
    let mut pipeline = memory_pipeline(config(4, 4), &StaticRegistry::demo());
    pipeline.capture(CaptureType::Infrared).unwrap();
    assert!(!pipeline.compositor().unwrap().any_enabled());
}

// === Persistence Tests ===

#[test]
fn test_directory_capture_writes_png() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("Screenshots");
    let mut pipeline = CapturePipeline::setup(
        config(6, 4),
        &StaticRegistry::demo(),
        DirectorySink::new(&out, "neptune-image"),
        Box::new(SequenceSource::constant(0)),
    );

    let receipt = pipeline.capture(CaptureType::Ultraviolet).unwrap();
    let path = receipt.path.unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();

    assert!(name.starts_with("neptune-image-ULTRAVIOLET_COLOUR-"));
    let decoded = decode_png(&fs::read(&path).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (6, 4));
    assert_eq!(pipeline.sink().list_captures().unwrap(), vec![path]);
}

#[test]
fn test_preview_never_persists() {
    let dir = TempDir::new().unwrap();
    let mut config = config(16, 16);
    config.preview_horizontal_resolution = 4;
    config.preview_vertical_resolution = 4;
    let mut pipeline = CapturePipeline::setup(
        config,
        &StaticRegistry::demo(),
        DirectorySink::new(dir.path(), "neptune-image"),
        Box::new(SequenceSource::constant(0)),
    );

    pipeline.open_preview().unwrap();
    for _ in 0..3 {
        assert!(pipeline.preview_capture());
    }

    let raster = pipeline.preview_raster().unwrap();
    assert_eq!((raster.width(), raster.height()), (4, 4));
    assert!(pipeline.sink().list_captures().unwrap().is_empty());
    assert!(!pipeline.compositor().unwrap().any_enabled());
}

#[test]
fn test_preview_matches_undamaged_capture() {
    let registry = uniform_scene(Rgb::new(0.2, 0.4, 0.6));
    let mut pipeline = memory_pipeline(config(2, 2), &registry);

    pipeline.open_preview().unwrap();
    pipeline.preview_capture();
    let preview = pipeline.preview_raster().unwrap().clone();

    pipeline.capture(CaptureType::FullColour).unwrap();
    let captured = last_capture(&pipeline);

    for (a, b) in preview.pixels().iter().zip(captured.pixels()) {
        assert_abs_diff_eq!(a.r, b.r, epsilon = EPS);
        assert_abs_diff_eq!(a.g, b.g, epsilon = EPS);
        assert_abs_diff_eq!(a.b, b.b, epsilon = EPS);
    }
}
