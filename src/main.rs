//! Neptune Camera CLI
//!
//! Command-line interface for the composite capture pipeline.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use neptune_camera::cli::commands;
use neptune_camera::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Neptune Camera v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd, cli.config.as_deref(), cli.seed),
        None => {
            println!("Neptune Camera v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(
    cmd: Commands,
    config_path: Option<&std::path::Path>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    if let Commands::InitConfig { path, force } = &cmd {
        return commands::init_config(path, *force)
            .with_context(|| format!("writing configuration to {}", path.display()));
    }

    let config = commands::load_config(config_path).context("loading configuration")?;

    match cmd {
        Commands::Capture {
            capture_type,
            output,
        } => commands::capture(config, &capture_type, output.as_deref(), seed)
            .with_context(|| format!("capturing {}", capture_type)),
        Commands::Preview { frames } => {
            commands::preview(config, frames, seed).context("running preview")
        }
        Commands::List { output } => {
            commands::list(&config, output.as_deref()).context("listing captures")
        }
        Commands::Types => commands::types(&config).context("listing capture types"),
        Commands::InitConfig { .. } => Ok(()),
    }
}
