// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-recorder")]
#[command(about = "Capture, export and replay depth camera streams")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record frames to an output directory
    Record {
        /// Output directory (default: from configuration)
        #[arg(short, long, conflicts_with = "ask")]
        output: Option<PathBuf>,

        /// Ask for the output directory on stdin
        #[arg(long)]
        ask: bool,

        /// Export color frames as JPEG
        #[arg(long)]
        color: bool,

        /// Export depth frames as 16-bit PNG
        #[arg(long)]
        depth: bool,

        /// Export the skeleton table
        #[arg(long)]
        body: bool,

        /// Number of ticks to record (stops early on Ctrl+C)
        #[arg(short, long, default_value = "300")]
        frames: u64,

        /// JPEG quality for color frames
        #[arg(short, long, value_enum)]
        quality: Option<cli::QualityArg>,

        /// Write images on a background thread
        #[arg(long)]
        queued: bool,
    },

    /// Capture a few ticks and save preview images
    Preview {
        /// Directory for the preview images (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ticks to capture before saving
        #[arg(short, long, default_value = "1")]
        ticks: u64,

        /// Out-of-range depth handling
        #[arg(short, long, value_enum)]
        scaling: Option<cli::ScalingArg>,
    },

    /// Replay a recorded clip
    Play {
        /// Clip file
        clip: PathBuf,

        /// Extra passes after the first one
        #[arg(short, long)]
        loops: Option<u32>,
    },

    /// Show or reset the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Overwrite the configuration file with defaults
    Reset,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_recorder=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            output,
            ask,
            color,
            depth,
            body,
            frames,
            quality,
            queued,
        } => cli::record(cli::RecordArgs {
            output,
            ask,
            color,
            depth,
            body,
            frames,
            quality,
            queued,
        }),
        Commands::Preview {
            output,
            ticks,
            scaling,
        } => cli::preview(output, ticks, scaling),
        Commands::Play { clip, loops } => cli::play(clip, loops),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::config_show(),
            ConfigAction::Path => cli::config_path(),
            ConfigAction::Reset => cli::config_reset(),
        },
    }
}
