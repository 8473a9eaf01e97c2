//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "brewscale.toml";

#[derive(Parser, Debug)]
#[command(name = "brewscale", version, about = "Brew scale with shot timer")]
pub struct Cli {
    /// Path to config TOML (defaults to ./brewscale.toml, or built-in defaults if absent)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit frames, results and errors as JSON lines; logs go to stderr as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tare, then show weight and brew time until Ctrl-C
    Run {
        /// Stop after this many loop iterations
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
    },
    /// One bounded amplifier read (hardware presence / sim ok)
    SelfCheck,
    /// Print the averaged raw reading of the empty platform
    Tare {
        /// Raw reads to average (defaults to calibration.tare_samples)
        #[arg(long, value_name = "N")]
        samples: Option<usize>,
    },
}

#[inline]
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
