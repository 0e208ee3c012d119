//! # Dining Philosophers
//!
//! N philosophers sit around a table with one fork between each pair of neighbours.
//! To eat, a philosopher needs both adjacent forks at once. This crate runs that
//! contention for real, one OS thread per philosopher, and keeps it free of deadlock.
//!
//! ## Core Components
//!
//! - **[fork]**: [`Fork`], an exclusive lock that remembers its holder, and [`ForkGuard`].
//! - **[strategy]**: [`AcquisitionStrategy`], which fork each seat reaches for first, and
//!   the criterion that proves a strategy cannot close the wait-for ring.
//! - **[philosopher]**: the think → acquire → eat → release loop and its [`DiningEvent`]s.
//! - **[signal]**: [`StopSignal`], the one-shot flag every philosopher samples once per cycle.
//! - **[runtime]**: [`DiningTable`], which seats everyone, arms the deadline and joins all
//!   threads, plus [`setup_tracing`](runtime::setup_tracing).
//! - **[event_log]**: the single-writer log that turns events into output lines.
//! - **[sim]**: a step-level model used to explore every reachable state of a table.
//!
//! ## Quick Start
//!
//! ```ignore
//! let (writer, log) = LogWriter::new();
//! let writer = tokio::spawn(writer.run(StdoutSink::new()));
//!
//! let config = DiningConfig::new(5).with_deadline(Duration::from_secs(3));
//! let summary = DiningTable::new(config, log)?.run().await?;
//! writer.await?;
//! ```
//!
//! ## Testing
//!
//! See [`event_log::capture`] for an in-memory log that collects every line a table
//! produces.

pub mod config;
pub mod error;
pub mod event_log;
pub mod fork;
pub mod philosopher;
pub mod runtime;
pub mod signal;
pub mod sim;
pub mod strategy;

pub use config::{DiningConfig, PhaseTiming};
pub use error::{ConfigError, DiningError};
pub use event_log::{CapturedLog, LogClient, LogWriter, StdoutSink};
pub use fork::{Fork, ForkGuard};
pub use philosopher::{DiningEvent, Philosopher, PhilosopherReport, PhilosopherState};
pub use runtime::{DiningSummary, DiningTable};
pub use signal::StopSignal;
pub use strategy::{AcquisitionStrategy, Side};
