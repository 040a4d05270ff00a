//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "tank", version, about = "Tank lever controller (simulated construct)")]
pub struct Cli {
    /// Path to config TOML (engine constants, schedule, devices)
    #[arg(long, value_name = "FILE", default_value = "etc/tank.toml")]
    pub config: PathBuf,

    /// Print JSON lines instead of status text; errors become JSON too
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop against the simulated construct
    Run {
        /// Number of ticks to run; runs until Ctrl-C when omitted
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Lever script CSV (strict header: tick,lever,angle_deg)
        #[arg(
            long,
            value_name = "FILE",
            long_help = "Lever script CSV with the strict header 'tick,lever,angle_deg'.\n\nA row with tick T moves the named hinge after T ticks have completed, so tick 0 rows set the angles seen by the first tick. Rows must be in non-decreasing tick order and name hinges of the [[devices]] table."
        )]
        script: Option<PathBuf>,
        /// Pace ticks on the wall clock (update_every / base_tick_hz seconds)
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Print total runtime on completion
        #[arg(long, action = ArgAction::SetTrue)]
        print_runtime: bool,
    },
    /// Show how the construct's devices were classified
    Discover,
    /// Validate the config and run a single tick
    SelfCheck,
}
