//! # Wait-for Simulator
//!
//! A step-level model of the table used to check acquisition strategies without real
//! threads or sleeps. Each seat is in one of three states:
//!
//! - [`SeatState::Thinking`]: holds nothing, next reaches for its first fork
//! - [`SeatState::Holding`]: holds its first fork, next reaches for its second
//! - [`SeatState::Eating`]: holds both, next puts them down
//!
//! A step advances one seat if the fork it needs is free. The model deadlocks when no
//! seat can step, which on a ring is the same as the wait-for graph containing a cycle.
//!
//! [`explore`] walks every reachable state of a table and reports the first deadlocked
//! one. [`Simulation::run_random`] drives a long randomized trace from a seed.

use crate::strategy::AcquisitionStrategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashSet, VecDeque};

/// Model state of one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatState {
    Thinking,
    Holding,
    Eating,
}

/// How a randomized run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimOutcome {
    /// The meal target was reached.
    Completed { steps: u64 },
    /// Every seat ended up waiting on a neighbour.
    Deadlocked { cycle: Vec<usize>, steps: u64 },
}

/// Result of an exhaustive exploration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exploration {
    /// Number of distinct reachable states visited.
    pub states: usize,
    /// The first deadlocked state found, if any.
    pub deadlock: Option<Vec<SeatState>>,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    /// `[first, second]` fork indices per seat.
    orders: Vec<[usize; 2]>,
    seats: Vec<SeatState>,
    forks: Vec<Option<usize>>,
    meals: Vec<u64>,
}

impl Simulation {
    pub fn new(seats: usize, strategy: AcquisitionStrategy) -> Self {
        let orders = (0..seats)
            .map(|id| {
                let [first, second] = strategy.acquisition_order(id, seats);
                [first.fork_index(id, seats), second.fork_index(id, seats)]
            })
            .collect();

        Self {
            orders,
            seats: vec![SeatState::Thinking; seats],
            forks: vec![None; seats],
            meals: vec![0; seats],
        }
    }

    pub fn seats(&self) -> &[SeatState] {
        &self.seats
    }

    /// Current holder of every fork.
    pub fn forks(&self) -> &[Option<usize>] {
        &self.forks
    }

    pub fn meals(&self) -> &[u64] {
        &self.meals
    }

    pub fn total_meals(&self) -> u64 {
        self.meals.iter().sum()
    }

    /// The fork seat `id` is waiting for, if it is waiting for one.
    fn wanted_fork(&self, id: usize) -> Option<usize> {
        match self.seats[id] {
            SeatState::Thinking => Some(self.orders[id][0]),
            SeatState::Holding => Some(self.orders[id][1]),
            SeatState::Eating => None,
        }
    }

    pub fn can_step(&self, id: usize) -> bool {
        self.wanted_fork(id)
            .map_or(true, |fork| self.forks[fork].is_none())
    }

    /// Seats that can make progress right now.
    pub fn enabled(&self) -> Vec<usize> {
        (0..self.seats.len()).filter(|&id| self.can_step(id)).collect()
    }

    pub fn is_deadlocked(&self) -> bool {
        self.enabled().is_empty()
    }

    /// Advances seat `id` by one transition. Returns `false` if it is blocked.
    pub fn step(&mut self, id: usize) -> bool {
        if !self.can_step(id) {
            return false;
        }

        let [first, second] = self.orders[id];
        self.seats[id] = match self.seats[id] {
            SeatState::Thinking => {
                self.forks[first] = Some(id);
                SeatState::Holding
            }
            SeatState::Holding => {
                self.forks[second] = Some(id);
                SeatState::Eating
            }
            SeatState::Eating => {
                self.forks[first] = None;
                self.forks[second] = None;
                self.meals[id] += 1;
                SeatState::Thinking
            }
        };
        true
    }

    /// Finds a cycle in the wait-for graph (`a -> b` when `a` wants a fork `b` holds).
    ///
    /// Every seat waits on at most one other, so following edges from each seat either
    /// dead-ends or loops.
    pub fn wait_for_cycle(&self) -> Option<Vec<usize>> {
        let waits_on = |id: usize| {
            self.wanted_fork(id)
                .and_then(|fork| self.forks[fork])
                .filter(|&holder| holder != id)
        };

        for start in 0..self.seats.len() {
            let mut path = vec![start];
            let mut current = start;
            while let Some(next) = waits_on(current) {
                if let Some(pos) = path.iter().position(|&seat| seat == next) {
                    return Some(path[pos..].to_vec());
                }
                path.push(next);
                current = next;
            }
        }
        None
    }

    /// Runs a random schedule until `target_meals` meals have been eaten in total, or
    /// until a wait-for cycle forms.
    pub fn run_random(&mut self, seed: u64, target_meals: u64) -> SimOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut steps = 0;

        while self.total_meals() < target_meals {
            if let Some(cycle) = self.wait_for_cycle() {
                return SimOutcome::Deadlocked { cycle, steps };
            }
            let enabled = self.enabled();
            if enabled.is_empty() {
                return SimOutcome::Deadlocked {
                    cycle: Vec::new(),
                    steps,
                };
            }

            let id = enabled[rng.random_range(0..enabled.len())];
            self.step(id);
            steps += 1;
        }

        SimOutcome::Completed { steps }
    }
}

/// Explores every state reachable from an all-thinking table of `seats` seats.
pub fn explore(seats: usize, strategy: AcquisitionStrategy) -> Exploration {
    let start = Simulation::new(seats, strategy);
    let mut visited = HashSet::from([start.seats.clone()]);
    let mut queue = VecDeque::from([start]);

    while let Some(sim) = queue.pop_front() {
        let enabled = sim.enabled();
        if enabled.is_empty() {
            return Exploration {
                states: visited.len(),
                deadlock: Some(sim.seats),
            };
        }

        for id in enabled {
            let mut next = sim.clone();
            next.step(id);
            if visited.insert(next.seats.clone()) {
                queue.push_back(next);
            }
        }
    }

    Exploration {
        states: visited.len(),
        deadlock: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_strategies_never_deadlock() {
        for seats in 2..=8 {
            for strategy in [AcquisitionStrategy::Parity, AcquisitionStrategy::Ordered] {
                let result = explore(seats, strategy);
                assert_eq!(result.deadlock, None, "{strategy} with {seats} seats");
                assert!(result.states > 1);
            }
        }
    }

    #[test]
    fn test_uniform_strategy_deadlocks() {
        for seats in 2..=6 {
            let result = explore(seats, AcquisitionStrategy::Uniform);
            assert_eq!(
                result.deadlock,
                Some(vec![SeatState::Holding; seats]),
                "{seats} seats"
            );
        }
    }

    #[test]
    fn test_everyone_grabbing_first_fork() {
        // Uniform: everyone takes their left fork and the ring closes.
        let mut sim = Simulation::new(5, AcquisitionStrategy::Uniform);
        for id in 0..5 {
            assert!(sim.step(id));
        }
        assert!(sim.is_deadlocked());
        let mut cycle = sim.wait_for_cycle().unwrap();
        cycle.sort_unstable();
        assert_eq!(cycle, vec![0, 1, 2, 3, 4]);

        // Parity: odd seats find their first fork already taken by the even seat on
        // their left.
        let mut sim = Simulation::new(5, AcquisitionStrategy::Parity);
        let stepped: Vec<bool> = (0..5).map(|id| sim.step(id)).collect();
        assert_eq!(stepped, vec![true, false, true, false, true]);
        assert!(!sim.is_deadlocked());
        assert_eq!(sim.wait_for_cycle(), None);
    }

    #[test]
    fn test_eating_releases_both_forks() {
        let mut sim = Simulation::new(3, AcquisitionStrategy::Parity);
        assert!(sim.step(1));
        assert!(sim.step(1));
        assert_eq!(sim.seats()[1], SeatState::Eating);
        assert_eq!(sim.forks(), &[None, Some(1), Some(1)]);

        assert!(!sim.step(0), "philosopher 0 wants fork 1 first");
        assert!(sim.step(1));
        assert_eq!(sim.forks(), &[None, None, None]);
        assert_eq!(sim.meals(), &[0, 1, 0]);
    }

    #[test]
    fn test_parity_ten_thousand_random_cycles() {
        for seed in [1, 7, 42] {
            let mut sim = Simulation::new(5, AcquisitionStrategy::Parity);
            let outcome = sim.run_random(seed, 10_000);
            assert!(matches!(outcome, SimOutcome::Completed { .. }), "seed {seed}: {outcome:?}");
            assert!(sim.total_meals() >= 10_000);
            assert!(sim.meals().iter().all(|&m| m > 0), "every seat eats: {:?}", sim.meals());
        }
    }

    #[test]
    fn test_uniform_random_run_finds_the_cycle() {
        let mut sim = Simulation::new(5, AcquisitionStrategy::Uniform);
        match sim.run_random(3, 10_000) {
            SimOutcome::Deadlocked { cycle, .. } => assert_eq!(cycle.len(), 5),
            other => panic!("expected a deadlock, got {other:?}"),
        }
    }
}
