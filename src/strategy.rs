//! # Acquisition Strategies
//!
//! Every philosopher needs the fork on its left (`fork[i]`) and the fork on its right
//! (`fork[(i + 1) % n]`). If all of them reach for the same side first, each can end
//! up holding one fork and waiting forever on its neighbour. A strategy decides, per
//! philosopher, which side is taken first.
//!
//! ## Deadlock criterion
//!
//! Only a philosopher holding its first fork and waiting on its second can sit on a
//! wait-for cycle, and on a ring such a cycle has to pass through every seat. That is
//! only possible when the `n` first forks are pairwise distinct. So a strategy is
//! deadlock-free for `n` seats exactly when two philosophers share a first fork:
//!
//! - [`Parity`](AcquisitionStrategy::Parity): philosopher 0 (even, right first) and
//!   philosopher 1 (odd, left first) both start with fork 1, for every `n >= 2`.
//! - [`Ordered`](AcquisitionStrategy::Ordered): philosophers 0 and `n - 1` both start
//!   with fork 0.
//! - [`Uniform`](AcquisitionStrategy::Uniform): first forks are `0..n`, all distinct.
//!
//! [`AcquisitionStrategy::admits_deadlock`] checks the criterion and the
//! [`sim`](crate::sim) module confirms it by exploring every reachable state.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// One of the two forks next to a philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Ring index of this side's fork for philosopher `id` at a table of `seats`.
    pub fn fork_index(self, id: usize, seats: usize) -> usize {
        match self {
            Side::Left => id,
            Side::Right => (id + 1) % seats,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Rule deciding the order in which a philosopher picks up its forks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionStrategy {
    /// Even seats take the right fork first, odd seats the left fork first.
    #[default]
    Parity,
    /// Every seat takes the fork with the lower ring index first.
    Ordered,
    /// Every seat takes the left fork first. Deadlock-prone for any table size.
    Uniform,
}

impl AcquisitionStrategy {
    pub fn name(self) -> &'static str {
        match self {
            AcquisitionStrategy::Parity => "parity",
            AcquisitionStrategy::Ordered => "ordered",
            AcquisitionStrategy::Uniform => "uniform",
        }
    }

    /// The sides philosopher `id` acquires, first to last.
    pub fn acquisition_order(self, id: usize, seats: usize) -> [Side; 2] {
        const LEFT_FIRST: [Side; 2] = [Side::Left, Side::Right];
        const RIGHT_FIRST: [Side; 2] = [Side::Right, Side::Left];

        match self {
            AcquisitionStrategy::Parity if id % 2 == 0 => RIGHT_FIRST,
            AcquisitionStrategy::Parity => LEFT_FIRST,
            AcquisitionStrategy::Ordered => {
                if Side::Left.fork_index(id, seats) < Side::Right.fork_index(id, seats) {
                    LEFT_FIRST
                } else {
                    RIGHT_FIRST
                }
            }
            AcquisitionStrategy::Uniform => LEFT_FIRST,
        }
    }

    /// Ring index of the fork philosopher `id` reaches for first.
    pub fn first_fork(self, id: usize, seats: usize) -> usize {
        self.acquisition_order(id, seats)[0].fork_index(id, seats)
    }

    /// Whether a table of `seats` philosophers can reach a state where everyone holds
    /// one fork and waits on the next.
    pub fn admits_deadlock(self, seats: usize) -> bool {
        let mut taken = vec![false; seats];
        for id in 0..seats {
            let first = self.first_fork(id, seats);
            if taken[first] {
                return false;
            }
            taken[first] = true;
        }
        true
    }
}

impl fmt::Display for AcquisitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the strategies a table may be seated with. `uniform` is not accepted; it is
/// only constructed in code, for analysis.
impl FromStr for AcquisitionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parity" => Ok(AcquisitionStrategy::Parity),
            "ordered" => Ok(AcquisitionStrategy::Ordered),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}
