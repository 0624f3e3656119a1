//! CLI parse: clap types for scene-replay. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scene-replay - replay timed scene updates against a console graph
#[derive(Parser)]
#[command(name = "scene-replay")]
#[command(about = "Replay time-stamped scene update timelines")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the user config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a JSON-lines timeline
    Play {
        /// Timeline file
        path: PathBuf,
        /// Stream time advance per tick, in milliseconds
        #[arg(long, default_value = "40")]
        step_ms: u32,
        /// Stop at this stream time even if the timeline has not ended
        #[arg(long, default_value = "600000")]
        until_ms: u32,
        /// Ingest incrementally instead of in one shot
        #[arg(long)]
        progressive: bool,
        /// Base stream id driving the root timeline
        #[arg(long, default_value = "1")]
        stream_id: u16,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Load a timeline and list its streams
    Inspect {
        /// Timeline file
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Print only the user config file location
        #[arg(long)]
        path: bool,
    },
}
