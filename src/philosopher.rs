//! # Philosophers
//!
//! A [`Philosopher`] runs its own lifecycle loop on a dedicated thread:
//!
//! ```text
//! Thinking ──(stop set?)──► Stopped
//!    │ no
//!    ▼
//! AwaitingForks ──► Eating ──► (put down forks) ──► Thinking
//! ```
//!
//! The stop signal is sampled once per cycle, right after thinking. A philosopher that
//! is already reaching for forks, or eating, finishes the cycle and puts its forks down
//! before it looks at the signal again. Stopped philosophers hold nothing.
//!
//! Every transition that changes what a philosopher holds, or what it is doing, is
//! reported to the event log as one line, e.g. `Philosopher 3 picked up left fork.`

use crate::config::PhaseTiming;
use crate::event_log::LogClient;
use crate::fork::{Fork, ForkGuard};
use crate::signal::StopSignal;
use crate::strategy::{AcquisitionStrategy, Side};
use std::fmt;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info_span, trace};

/// Where a philosopher is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhilosopherState {
    Thinking,
    AwaitingForks,
    Eating,
    Stopped,
}

/// Something worth telling the event log about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiningEvent {
    Thinking,
    PickedUp(Side),
    Eating,
    PutDownForks,
    Done,
}

impl DiningEvent {
    const ALL: [DiningEvent; 6] = [
        DiningEvent::Thinking,
        DiningEvent::PickedUp(Side::Left),
        DiningEvent::PickedUp(Side::Right),
        DiningEvent::Eating,
        DiningEvent::PutDownForks,
        DiningEvent::Done,
    ];

    /// The full output line for philosopher `id`.
    pub fn line(self, id: usize) -> String {
        format!("Philosopher {} {}.", id, self)
    }

    /// Parses a line produced by [`DiningEvent::line`].
    ///
    /// Returns `None` for anything that is not exactly one well-formed event line.
    pub fn parse_line(line: &str) -> Option<(usize, DiningEvent)> {
        let rest = line.strip_prefix("Philosopher ")?.strip_suffix('.')?;
        let (id, text) = rest.split_once(' ')?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id = id.parse().ok()?;
        let event = Self::ALL.into_iter().find(|event| event.to_string() == text)?;
        Some((id, event))
    }
}

impl fmt::Display for DiningEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiningEvent::Thinking => f.write_str("is thinking"),
            DiningEvent::PickedUp(side) => write!(f, "picked up {} fork", side),
            DiningEvent::Eating => f.write_str("is eating"),
            DiningEvent::PutDownForks => f.write_str("put down forks"),
            DiningEvent::Done => f.write_str("is done dining"),
        }
    }
}

/// What a philosopher hands back to the table when it leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhilosopherReport {
    pub id: usize,
    pub meals: u64,
}

/// One seat at the table.
pub struct Philosopher {
    id: usize,
    left: Arc<Fork>,
    right: Arc<Fork>,
    order: [Side; 2],
    stop: StopSignal,
    log: LogClient,
    timing: PhaseTiming,
    state: PhilosopherState,
    meals: u64,
}

impl Philosopher {
    /// Seats philosopher `id` between `forks[id]` (left) and `forks[(id + 1) % n]`
    /// (right).
    pub fn new(
        id: usize,
        forks: &[Arc<Fork>],
        strategy: AcquisitionStrategy,
        stop: StopSignal,
        log: LogClient,
        timing: PhaseTiming,
    ) -> Self {
        let seats = forks.len();
        Self {
            id,
            left: Arc::clone(&forks[Side::Left.fork_index(id, seats)]),
            right: Arc::clone(&forks[Side::Right.fork_index(id, seats)]),
            order: strategy.acquisition_order(id, seats),
            stop,
            log,
            timing,
            state: PhilosopherState::Thinking,
            meals: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> PhilosopherState {
        self.state
    }

    /// The sides this philosopher acquires, first to last.
    pub fn acquisition_order(&self) -> [Side; 2] {
        self.order
    }

    /// Runs the lifecycle loop until the stop signal is observed. Blocks the calling
    /// thread for the whole dinner.
    pub fn dine(mut self) -> PhilosopherReport {
        let span = info_span!("philosopher", id = self.id);
        let _enter = span.enter();
        debug!(
            left = self.left.index(),
            right = self.right.index(),
            order = ?self.order,
            "Seated"
        );

        loop {
            self.think();
            if self.stop.is_set() {
                break;
            }

            let forks = self.pick_up_forks();
            self.eat();
            self.put_down_forks(forks);
        }

        self.transition(PhilosopherState::Stopped);
        self.announce(DiningEvent::Done);
        debug!(meals = self.meals, "Left the table");

        PhilosopherReport {
            id: self.id,
            meals: self.meals,
        }
    }

    fn think(&mut self) {
        self.transition(PhilosopherState::Thinking);
        self.announce(DiningEvent::Thinking);
        thread::sleep(self.timing.sample());
    }

    fn pick_up_forks(&mut self) -> [ForkGuard; 2] {
        self.transition(PhilosopherState::AwaitingForks);
        let [first, second] = self.order;
        let first = self.pick_up(first);
        let second = self.pick_up(second);
        [first, second]
    }

    fn pick_up(&self, side: Side) -> ForkGuard {
        let fork = match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        };
        let guard = fork.acquire(self.id);
        self.announce(DiningEvent::PickedUp(side));
        guard
    }

    fn eat(&mut self) {
        self.transition(PhilosopherState::Eating);
        self.announce(DiningEvent::Eating);
        thread::sleep(self.timing.sample());
        self.meals += 1;
    }

    // Announced before the guards drop: in the log, a fork's pickup and put-down lines
    // always enclose the interval in which it was really held.
    fn put_down_forks(&mut self, forks: [ForkGuard; 2]) {
        self.announce(DiningEvent::PutDownForks);
        drop(forks);
    }

    fn transition(&mut self, next: PhilosopherState) {
        trace!(from = ?self.state, to = ?next, "Transition");
        self.state = next;
    }

    fn announce(&self, event: DiningEvent) {
        self.log.log(event.line(self.id));
    }
}
