//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "arena", version, about = "Arena prop controller CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/arena.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides the
    /// config's logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one full match on simulated hardware
    Run {
        /// Target dial pattern (up to 5 decimal digits)
        #[arg(long)]
        target: u32,
        /// Fixed entropy value for deterministic fighting-pattern selection;
        /// defaults to a high-resolution timer sample
        #[arg(long, value_name = "N")]
        seed: Option<u32>,
        /// Inject a saber hit at this match time in ms (repeatable)
        #[arg(long = "hit-at", value_name = "MS")]
        hit_at: Vec<u64>,
        /// Override the configured match runtime in ms
        #[arg(long, value_name = "MS")]
        runtime_ms: Option<u64>,
        /// Start immediately instead of waiting for the console button
        #[arg(long, action = ArgAction::SetTrue)]
        no_wait: bool,
    },
    /// Parse and validate the config file
    Check,
    /// Print the fighting-pattern table
    Patterns,
}
