use clap::{Args, Parser, Subcommand};
use telemetry_rs::{AggregationMode, InterpolationMode};

#[derive(Parser)]
#[command(
    name = "telemetry",
    version,
    about = "Real-time telemetry buffer and analytics tool",
    long_about = "Run analytics requests from JSON and replay telemetry sample files through\n\
                  the streaming buffer. Buffer defaults can be set with TELEMETRY_* variables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run analytics requests ({id, task, data}) and print the responses
    Analyze(AnalyzeArgs),
    /// Feed a JSON array of samples through a streaming buffer
    Replay(ReplayArgs),
    /// List supported analytics tasks
    Tasks(TasksArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Request file: one request object or an array of them (default: stdin)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Requests in flight between the CLI and the worker
    #[arg(long, env = "TELEMETRY_QUEUE_CAPACITY", default_value_t = 64)]
    pub queue_capacity: usize,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON array of samples ({timestamp, value, streamId?})
    #[arg(short, long)]
    pub input: String,

    /// Maximum retained samples
    #[arg(long, env = "TELEMETRY_CAPACITY", default_value_t = 10_000)]
    pub capacity: usize,

    /// Retention window in milliseconds (0 = unbounded)
    #[arg(long, env = "TELEMETRY_WINDOW_MS", default_value_t = 0)]
    pub window_ms: u64,

    /// Compress batch ingestion once this many samples are held
    #[arg(long, env = "TELEMETRY_COMPRESSION_THRESHOLD")]
    pub compression_threshold: Option<usize>,

    /// Interpolation mode (step, linear, smooth)
    #[arg(long, env = "TELEMETRY_INTERPOLATION", default_value = "linear")]
    pub interpolation: InterpolationMode,

    /// Bucket aggregation mode (mean, min, max, last)
    #[arg(long, env = "TELEMETRY_AGGREGATION", default_value = "mean")]
    pub aggregation: AggregationMode,

    /// Samples per ingestion call; 1 uses single pushes
    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,

    /// Report aggregated buckets of this width in milliseconds
    #[arg(long)]
    pub bucket_ms: Option<u64>,

    /// Report the newest N samples
    #[arg(long)]
    pub latest: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_replay_mode_flags_parse() {
        let cli = Cli::parse_from([
            "telemetry",
            "replay",
            "--input",
            "samples.json",
            "--interpolation",
            "step",
            "--aggregation",
            "max",
            "--batch-size",
            "10",
        ]);
        let Command::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.interpolation, InterpolationMode::Step);
        assert_eq!(args.aggregation, AggregationMode::Max);
        assert_eq!(args.batch_size, 10);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result = Cli::try_parse_from([
            "telemetry",
            "replay",
            "--input",
            "x.json",
            "--aggregation",
            "median",
        ]);
        assert!(result.is_err());
    }
}
