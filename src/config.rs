//! Table configuration.
//!
//! Raw command-line values go through [`DiningConfig::from_args`]; everything else in
//! the crate only ever sees a configuration that passed [`DiningConfig::validate`].

use crate::error::ConfigError;
use crate::strategy::AcquisitionStrategy;
use rand::Rng;
use std::time::Duration;

/// Inclusive range of the random delay used for both thinking and eating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    min_ms: u64,
    max_ms: u64,
}

impl PhaseTiming {
    pub const DEFAULT_MIN_MS: u64 = 500;
    pub const DEFAULT_MAX_MS: u64 = 1500;

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Result<Self, ConfigError> {
        if min_ms > max_ms {
            return Err(ConfigError::InvalidDelayRange { min_ms, max_ms });
        }
        Ok(Self { min_ms, max_ms })
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    /// Draws one delay, uniformly distributed over the range.
    pub fn sample(&self) -> Duration {
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            min_ms: Self::DEFAULT_MIN_MS,
            max_ms: Self::DEFAULT_MAX_MS,
        }
    }
}

/// Everything the table needs to seat and run its philosophers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiningConfig {
    /// Number of philosophers, and therefore of forks.
    pub philosophers: usize,
    /// Wall-clock time after which every philosopher is asked to stop.
    /// `None` runs the table forever.
    pub deadline: Option<Duration>,
    pub strategy: AcquisitionStrategy,
    pub timing: PhaseTiming,
}

impl DiningConfig {
    pub const MIN_PHILOSOPHERS: usize = 2;

    pub fn new(philosophers: usize) -> Self {
        Self {
            philosophers,
            deadline: None,
            strategy: AcquisitionStrategy::default(),
            timing: PhaseTiming::default(),
        }
    }

    /// Sets the deadline. A zero duration means "no deadline".
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = (!deadline.is_zero()).then_some(deadline);
        self
    }

    pub fn with_strategy(mut self, strategy: AcquisitionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_timing(mut self, timing: PhaseTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Builds a validated configuration from raw command-line values.
    ///
    /// `philosophers` is signed so that negative input is reported as a domain error
    /// instead of a parse failure.
    pub fn from_args(
        philosophers: i64,
        deadline_seconds: Option<u64>,
        strategy: AcquisitionStrategy,
        timing: PhaseTiming,
    ) -> Result<Self, ConfigError> {
        let seats = usize::try_from(philosophers)
            .ok()
            .filter(|&n| n >= Self::MIN_PHILOSOPHERS)
            .ok_or(ConfigError::TooFewPhilosophers(philosophers))?;

        let mut config = Self::new(seats).with_strategy(strategy).with_timing(timing);
        if let Some(secs) = deadline_seconds {
            config = config.with_deadline(Duration::from_secs(secs));
        }
        config.validate()
    }

    /// Checks the invariants the table relies on.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.philosophers < Self::MIN_PHILOSOPHERS {
            return Err(ConfigError::TooFewPhilosophers(
                i64::try_from(self.philosophers).unwrap_or(i64::MAX),
            ));
        }
        if self.strategy.admits_deadlock(self.philosophers) {
            return Err(ConfigError::DeadlockProneStrategy {
                strategy: self.strategy.name(),
                philosophers: self.philosophers,
            });
        }
        Ok(self)
    }
}
