//! Command-line entry point.
//!
//! ```text
//! dining-philosophers <N> [deadline_seconds] [--strategy parity|ordered]
//!                     [--min-delay-ms MS] [--max-delay-ms MS]
//! ```
//!
//! Event lines go to stdout; usage errors and diagnostics go to stderr. Exit code 1
//! means the arguments were rejected, or a philosopher thread could not be started or
//! died.

use clap::{CommandFactory, Parser};
use dining_philosophers::runtime::setup_tracing;
use dining_philosophers::{
    AcquisitionStrategy, DiningConfig, DiningTable, LogWriter, PhaseTiming, StdoutSink,
};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "dining-philosophers")]
#[command(version)]
#[command(about = "Dining philosophers: N threads sharing N forks without deadlock")]
struct Cli {
    /// Number of philosophers (at least 2)
    #[arg(allow_negative_numbers = true)]
    philosophers: i64,

    /// Stop every philosopher after this many seconds (0 or omitted: run forever)
    deadline_seconds: Option<u64>,

    /// Fork acquisition strategy (parity or ordered)
    #[arg(long, default_value = "parity")]
    strategy: AcquisitionStrategy,

    /// Shortest think/eat delay, in milliseconds
    #[arg(long, default_value_t = PhaseTiming::DEFAULT_MIN_MS)]
    min_delay_ms: u64,

    /// Longest think/eat delay, in milliseconds
    #[arg(long, default_value_t = PhaseTiming::DEFAULT_MAX_MS)]
    max_delay_ms: u64,
}

fn usage_error(message: impl std::fmt::Display) -> ExitCode {
    eprintln!("{}", message);
    eprintln!("{}", Cli::command().render_usage());
    ExitCode::from(1)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help and --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let config = PhaseTiming::from_millis(cli.min_delay_ms, cli.max_delay_ms).and_then(|timing| {
        DiningConfig::from_args(
            cli.philosophers,
            cli.deadline_seconds,
            cli.strategy,
            timing,
        )
    });
    let config = match config {
        Ok(config) => config,
        Err(e) => return usage_error(e),
    };

    setup_tracing();
    dine(config).await
}

async fn dine(config: DiningConfig) -> ExitCode {
    info!(philosophers = config.philosophers, "Starting dinner");

    let (writer, log) = LogWriter::new();
    let writer = tokio::spawn(writer.run(StdoutSink::new()));

    let table = match DiningTable::new(config, log) {
        Ok(table) => table,
        Err(e) => return usage_error(e),
    };

    let result = table.run().await;

    // The table dropped every philosopher's client; this drains what is left.
    if let Err(e) = writer.await {
        error!(error = %e, "Log writer task failed");
    }

    match result {
        Ok(summary) => {
            info!(meals = summary.total_meals(), "Dinner finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Dinner aborted");
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}
