//! One-shot stop signal shared by every philosopher at the table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A monotonic, process-wide cancellation flag.
///
/// The flag starts cleared and can be set exactly once; there is no way to clear it
/// again. Clones share the same underlying flag, so the table hands one clone to each
/// philosopher and keeps one for the deadline timer.
///
/// Reading the flag never blocks. Philosophers sample it once per cycle, right after
/// they finish thinking.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signal.
    ///
    /// Returns `true` only for the call that actually flipped the flag, so the caller
    /// that wins can log the shutdown exactly once.
    pub fn trigger(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    /// Whether the signal has been set.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_is_one_shot() {
        let signal = StopSignal::new();
        assert!(!signal.is_set());

        assert!(signal.trigger(), "first trigger should flip the flag");
        assert!(signal.is_set());

        assert!(!signal.trigger(), "second trigger must be a no-op");
        assert!(signal.is_set(), "signal never resets");
    }

    #[test]
    fn test_clones_observe_the_same_flag() {
        let signal = StopSignal::new();
        let observer = signal.clone();

        let handle = std::thread::spawn(move || signal.trigger());
        assert!(handle.join().unwrap());

        assert!(observer.is_set());
    }
}
