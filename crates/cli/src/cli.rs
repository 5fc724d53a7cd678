//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// DeltaSync - lap telemetry capture
#[derive(Parser, Debug)]
#[command(
    name = "deltasync",
    author,
    version,
    about = "Lap telemetry capture with crash-safe snapshots",
    long_about = "Samples vehicle telemetry on a fixed interval, splits it into laps, \n\
                  computes per-sector statistics and keeps the latest lap in an \n\
                  atomically replaced JSON snapshot."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DELTASYNC_VERBOSE")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DELTASYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a capture session against the simulated vehicle or a replay
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Summarize a persisted snapshot file
    Inspect(InspectArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "DELTASYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the snapshot output directory
    #[arg(short, long, env = "DELTASYNC_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Host update step in simulation seconds
    #[arg(long, default_value = "0.05", env = "DELTASYNC_TICK")]
    pub tick: f64,

    /// Stop after this many simulation seconds (0 = until Ctrl+C or replay end)
    #[arg(long, default_value = "0", env = "DELTASYNC_DURATION")]
    pub duration: f64,

    /// Simulation seconds per wall-clock second
    #[arg(long, default_value = "1.0", env = "DELTASYNC_SPEEDUP")]
    pub speedup: f64,

    /// Play back a JSON-lines recording instead of the simulated vehicle
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Replay speed multiplier
    #[arg(long, default_value = "1.0")]
    pub replay_speed: f64,

    /// Restart the replay when it ends
    #[arg(long)]
    pub replay_loop: bool,

    /// Car name reported to the session
    #[arg(long)]
    pub car: Option<String>,

    /// Track name reported to the session
    #[arg(long)]
    pub track: Option<String>,

    /// Simulated lap length in meters
    #[arg(long, default_value = "2500")]
    pub track_length: f64,

    /// Validate configuration and exit without capturing
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "DELTASYNC_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Configuration file to validate
    #[arg(short, long, default_value = "deltasync.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `inspect` command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Snapshot file written by a capture session
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also list every telemetry sample
    #[arg(long)]
    pub samples: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["deltasync", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.config.is_none());
        assert_eq!(args.tick, 0.05);
        assert_eq!(args.duration, 0.0);
        assert_eq!(args.metrics_port, 0);
    }

    #[test]
    fn test_parse_replay() {
        let cli = Cli::try_parse_from([
            "deltasync",
            "-v",
            "run",
            "--replay",
            "laps.jsonl",
            "--replay-speed",
            "4",
            "--duration",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.replay, Some(PathBuf::from("laps.jsonl")));
        assert_eq!(args.replay_speed, 4.0);
        assert_eq!(args.duration, 30.0);
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::try_parse_from(["deltasync", "inspect", "telemetry.json", "--json"]).unwrap();
        let Commands::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.file, PathBuf::from("telemetry.json"));
        assert!(args.json);
    }
}
