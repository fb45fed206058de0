use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod output;

use cli::{Cli, Command};

/// Base filter for `-v` repetitions; `RUST_LOG` directives refine it
fn verbosity_filter(count: u8) -> log::LevelFilter {
    match count {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn init_logging(count: u8) {
    env_logger::Builder::new()
        .filter_level(verbosity_filter(count))
        .parse_default_env()
        .format_timestamp_millis()
        .format_target(count >= 2)
        .init();
}

async fn dispatch(command: Command) -> i32 {
    match command {
        Command::Analyze(args) => commands::analyze::execute(args).await,
        Command::Replay(args) => commands::replay::execute(args),
        Command::Tasks(args) => commands::tasks::execute(args),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    log::debug!("telemetry {}", env!("CARGO_PKG_VERSION"));

    std::process::exit(dispatch(cli.command).await);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0), log::LevelFilter::Warn);
        assert_eq!(verbosity_filter(1), log::LevelFilter::Info);
        assert_eq!(verbosity_filter(2), log::LevelFilter::Debug);
        assert_eq!(verbosity_filter(7), log::LevelFilter::Trace);
    }
}
