//! CLI Module
//!
//! Command-line interface driving the capture pipeline against the built-in
//! demo scene.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Neptune Camera - composite capture pipeline
#[derive(Parser, Debug)]
#[command(name = "neptune-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (JSON); defaults are used when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for damage and noise, for reproducible captures
    #[arg(short, long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take one capture and write it to the output directory
    #[command(name = "capture")]
    Capture {
        /// Capture type, e.g. FULL_COLOUR, red, uv, ir
        capture_type: String,

        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the preview tick and report the preview raster
    #[command(name = "preview")]
    Preview {
        /// Number of preview frames to render
        #[arg(short, long, default_value_t = 1)]
        frames: u32,
    },

    /// List captures in the output directory
    #[command(name = "list")]
    List {
        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration to a file
    #[command(name = "init-config")]
    InitConfig {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the capture types the configured camera offers
    #[command(name = "types")]
    Types,
}
