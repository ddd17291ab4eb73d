//! danmaku CLI
//!
//! Offline harness for the caption overlay engine: inspect a subtitle file or
//! replay it against a synthetic player clock and print placement events as
//! JSON lines.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::SimulateOptions;

#[derive(Parser)]
#[command(name = "danmaku")]
#[command(about = "Lane scheduling and collision avoidance for scrolling captions")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cues and skipped lines of a subtitle file
    Inspect {
        /// Subtitle file path
        input: PathBuf,

        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Replay a subtitle file and print placement events as JSON lines
    Simulate {
        /// Subtitle file path
        input: PathBuf,

        /// Container width in pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Container height in pixels
        #[arg(long, default_value = "720")]
        height: f32,

        /// Playback rate
        #[arg(long, default_value = "1.0")]
        rate: f64,

        /// Wall-clock milliseconds between frames
        #[arg(long, default_value = "100")]
        step_ms: f64,

        /// Media time to start from, in seconds
        #[arg(long, default_value = "0")]
        from: f64,

        /// Media time to stop at, in seconds (defaults to just past the last cue)
        #[arg(long)]
        until: Option<f64>,

        /// Engine configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use the narrow-screen preset regardless of width
        #[arg(long)]
        compact: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect { input, json } => commands::inspect(&input, json)?,

        Commands::Simulate {
            input,
            width,
            height,
            rate,
            step_ms,
            from,
            until,
            config,
            compact,
        } => {
            let engine_config = config::load(config.as_deref(), compact, width)?;
            let options = SimulateOptions {
                width,
                height,
                rate,
                step_ms,
                from,
                until,
            };
            commands::simulate(&input, engine_config, &options)?;
        }
    }

    Ok(())
}
