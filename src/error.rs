//! Error types for the dining table.
//!
//! Configuration problems are caught before any philosopher is seated. Once the
//! table is running, a philosopher thread can fail to start or die on a panic, and
//! either surfaces as a [`DiningError`] from [`DiningTable::run`](crate::DiningTable::run).

use thiserror::Error;
use tokio::task::JoinError;

/// Errors raised while validating a [`DiningConfig`](crate::config::DiningConfig).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The table needs at least two seats to form a ring of forks.
    #[error("There must be at least 2 philosophers (got {0}).")]
    TooFewPhilosophers(i64),

    /// The think/eat delay range is empty.
    #[error("Invalid delay range: minimum {min_ms} ms is greater than maximum {max_ms} ms.")]
    InvalidDelayRange { min_ms: u64, max_ms: u64 },

    /// The acquisition strategy lets every philosopher hold one fork and wait on the next.
    #[error("Strategy '{strategy}' can deadlock with {philosophers} philosophers.")]
    DeadlockProneStrategy {
        strategy: &'static str,
        philosophers: usize,
    },

    /// The strategy name is not one the table knows how to seat.
    #[error("Unknown acquisition strategy: {0}")]
    UnknownStrategy(String),
}

/// Errors raised while joining a running table.
#[derive(Debug, Error)]
pub enum DiningError {
    /// The operating system refused to start a philosopher's thread.
    #[error("Could not start a thread for philosopher {id}: {source}")]
    SpawnFailed {
        id: usize,
        #[source]
        source: std::io::Error,
    },

    /// A philosopher thread panicked.
    #[error("Philosopher {id} failed: {reason}")]
    PhilosopherFailed { id: usize, reason: String },

    /// The task joining the philosopher threads terminated abnormally.
    #[error("Philosopher supervisor failed: {0}")]
    SupervisorFailed(#[source] JoinError),

    /// The deadline timer task terminated abnormally.
    #[error("Deadline timer failed: {0}")]
    TimerFailed(#[source] JoinError),
}
