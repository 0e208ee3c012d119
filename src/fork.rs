//! # Forks
//!
//! A [`Fork`] is the exclusive resource two neighbouring philosophers compete for.
//! It behaves like a plain mutex (no fairness among waiters) but remembers *who*
//! holds it, which lets the table and the tests check mutual exclusion directly.
//!
//! Acquiring a fork returns a [`ForkGuard`]. Dropping the guard releases the fork,
//! so a philosopher cannot leave the eating phase while still holding one.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// An exclusive lock placed between two philosophers.
#[derive(Debug)]
pub struct Fork {
    index: usize,
    holder: Mutex<Option<usize>>,
    available: Condvar,
}

impl Fork {
    /// Creates a free fork at position `index` in the ring.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            holder: Mutex::new(None),
            available: Condvar::new(),
        }
    }

    /// Builds the ring of `count` forks shared by a table of `count` philosophers.
    pub fn ring(count: usize) -> Vec<Arc<Fork>> {
        (0..count).map(|index| Arc::new(Fork::new(index))).collect()
    }

    /// Position of this fork in the ring.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The philosopher currently holding this fork, if any.
    pub fn holder(&self) -> Option<usize> {
        *self.lock_holder()
    }

    /// Blocks until the fork is free, then hands it to `philosopher`.
    pub fn acquire(self: &Arc<Self>, philosopher: usize) -> ForkGuard {
        let mut holder = self.lock_holder();
        while holder.is_some() {
            holder = self
                .available
                .wait(holder)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *holder = Some(philosopher);
        trace!(fork = self.index, philosopher, "Fork acquired");

        ForkGuard {
            fork: Arc::clone(self),
            philosopher,
        }
    }

    /// Takes the fork if nobody holds it, without blocking.
    pub fn try_acquire(self: &Arc<Self>, philosopher: usize) -> Option<ForkGuard> {
        let mut holder = self.lock_holder();
        if holder.is_some() {
            return None;
        }
        *holder = Some(philosopher);

        Some(ForkGuard {
            fork: Arc::clone(self),
            philosopher,
        })
    }

    /// Hands the fork back and wakes one waiter.
    ///
    /// # Panics
    /// Releasing a fork held by someone else (or by nobody) means the acquisition
    /// protocol is broken. That is never recoverable, so it panics.
    fn release(&self, philosopher: usize) {
        let mut holder = self.lock_holder();
        assert_eq!(
            *holder,
            Some(philosopher),
            "philosopher {} released fork {} it does not hold",
            philosopher,
            self.index
        );
        *holder = None;
        drop(holder);

        trace!(fork = self.index, philosopher, "Fork released");
        self.available.notify_one();
    }

    // The guarded value is a plain `Option<usize>`, so a poisoned lock still holds
    // consistent state.
    fn lock_holder(&self) -> MutexGuard<'_, Option<usize>> {
        self.holder.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof that a philosopher holds a fork. Releases the fork when dropped.
#[derive(Debug)]
pub struct ForkGuard {
    fork: Arc<Fork>,
    philosopher: usize,
}

impl ForkGuard {
    pub fn fork_index(&self) -> usize {
        self.fork.index
    }
}

impl Drop for ForkGuard {
    fn drop(&mut self) {
        self.fork.release(self.philosopher);
    }
}
