use crate::config::DiningConfig;
use crate::error::{ConfigError, DiningError};
use crate::event_log::LogClient;
use crate::fork::Fork;
use crate::philosopher::{Philosopher, PhilosopherReport};
use crate::signal::StopSignal;
use std::any::Any;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Meals eaten by each philosopher, in seat order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiningSummary {
    pub reports: Vec<PhilosopherReport>,
}

impl DiningSummary {
    pub fn total_meals(&self) -> u64 {
        self.reports.iter().map(|r| r.meals).sum()
    }
}

/// The coordinator that seats, runs and joins every philosopher.
///
/// `DiningTable` is responsible for:
/// - **Wiring**: building the ring of forks and giving each philosopher its two neighbours
/// - **Launching**: one named OS thread per philosopher, plus an optional deadline timer
/// - **Supervision**: joining every philosopher and the timer before returning
///
/// # Example
///
/// ```ignore
/// let (writer, log) = LogWriter::new();
/// let writer = tokio::spawn(writer.run(StdoutSink::new()));
///
/// let config = DiningConfig::new(5).with_deadline(Duration::from_secs(10));
/// let table = DiningTable::new(config, log)?;
/// let summary = table.run().await?;
///
/// writer.await?;
/// ```
pub struct DiningTable {
    forks: Vec<Arc<Fork>>,
    philosophers: Vec<Philosopher>,
    stop: StopSignal,
    deadline: Option<Duration>,
}

impl DiningTable {
    /// Validates `config` and seats every philosopher. Nothing runs yet.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`DiningConfig::validate`]; no fork or
    /// philosopher is created in that case.
    pub fn new(config: DiningConfig, log: LogClient) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        let forks = Fork::ring(config.philosophers);
        let stop = StopSignal::new();

        let philosophers = (0..config.philosophers)
            .map(|id| {
                Philosopher::new(
                    id,
                    &forks,
                    config.strategy,
                    stop.clone(),
                    log.clone(),
                    config.timing,
                )
            })
            .collect();

        info!(
            philosophers = config.philosophers,
            strategy = %config.strategy,
            deadline = ?config.deadline,
            "Table seated"
        );

        Ok(Self {
            forks,
            philosophers,
            stop,
            deadline: config.deadline,
        })
    }

    /// The ring of forks, in index order.
    pub fn forks(&self) -> &[Arc<Fork>] {
        &self.forks
    }

    /// A handle to the table's stop signal. Triggering it ends the dinner after each
    /// philosopher finishes its current cycle.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs the dinner until every philosopher has stopped.
    ///
    /// Every philosopher gets its own OS thread, so the table does not depend on the
    /// size of Tokio's blocking pool. Without a deadline, and unless the stop signal is
    /// triggered from outside, this never returns.
    ///
    /// # Errors
    ///
    /// - [`DiningError::SpawnFailed`] if a philosopher's thread cannot be started. The
    ///   philosophers already dining are stopped and joined first.
    /// - [`DiningError::PhilosopherFailed`] for the first philosopher that panicked. A
    ///   panic triggers the stop signal, so the others leave after their current cycle.
    pub async fn run(self) -> Result<DiningSummary, DiningError> {
        let seats = self.philosophers.len();
        let stop = self.stop.clone();

        // =====================================================================
        // Step 1: One dedicated thread per philosopher
        // =====================================================================

        let (threads, mut failure) = launch(self.philosophers, &stop, |philosopher| {
            spawn_philosopher(philosopher, stop.clone())
        });

        // =====================================================================
        // Step 2: Arm the deadline
        // =====================================================================

        let timer = self.deadline.filter(|_| failure.is_none()).map(|deadline| {
            let stop = stop.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                if stop.trigger() {
                    info!(?deadline, "Deadline reached, asking philosophers to stop");
                }
            })
        });
        if timer.is_none() && failure.is_none() {
            info!(seats, "No deadline set, dining until stopped");
        }

        // =====================================================================
        // Step 3: Join everyone
        // =====================================================================

        let joined = match tokio::task::spawn_blocking(move || join_all(threads)).await {
            Ok(joined) => joined,
            Err(e) => {
                error!(error = %e, "Philosopher supervisor failed");
                stop.trigger();
                return Err(DiningError::SupervisorFailed(e));
            }
        };

        let mut reports = Vec::with_capacity(joined.len());
        for (id, result) in joined {
            match result {
                Ok(report) => reports.push(report),
                Err(payload) => {
                    let reason = panic_message(&*payload);
                    error!(id, %reason, "Philosopher failed");
                    if failure.is_none() {
                        failure = Some(DiningError::PhilosopherFailed { id, reason });
                    }
                }
            }
        }

        if let Some(timer) = timer {
            // Stopped from outside before the deadline fired.
            timer.abort();
            match timer.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    warn!(error = %e, "Deadline timer failed");
                    if failure.is_none() {
                        failure = Some(DiningError::TimerFailed(e));
                    }
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        let summary = DiningSummary { reports };
        info!(seats, meals = summary.total_meals(), "All philosophers are done dining");
        Ok(summary)
    }
}

type Seat = (usize, thread::JoinHandle<PhilosopherReport>);

/// Starts every philosopher with `spawn`, in seat order.
///
/// On the first spawn error the stop signal is triggered and the remaining
/// philosophers are never started; the threads already running are returned so the
/// caller can still join them.
fn launch<F>(
    philosophers: Vec<Philosopher>,
    stop: &StopSignal,
    mut spawn: F,
) -> (Vec<Seat>, Option<DiningError>)
where
    F: FnMut(Philosopher) -> io::Result<thread::JoinHandle<PhilosopherReport>>,
{
    let mut threads = Vec::with_capacity(philosophers.len());
    for philosopher in philosophers {
        let id = philosopher.id();
        match spawn(philosopher) {
            Ok(handle) => threads.push((id, handle)),
            Err(source) => {
                error!(id, error = %source, "Could not start philosopher thread");
                stop.trigger();
                return (threads, Some(DiningError::SpawnFailed { id, source }));
            }
        }
    }
    (threads, None)
}

fn spawn_philosopher(
    philosopher: Philosopher,
    stop: StopSignal,
) -> io::Result<thread::JoinHandle<PhilosopherReport>> {
    thread::Builder::new()
        .name(format!("philosopher-{}", philosopher.id()))
        .spawn(move || {
            let _stop_on_panic = StopOnPanic(stop);
            philosopher.dine()
        })
}

/// Joins threads in seat order. Blocks until every one of them has exited.
fn join_all(threads: Vec<Seat>) -> Vec<(usize, thread::Result<PhilosopherReport>)> {
    threads
        .into_iter()
        .map(|(id, handle)| (id, handle.join()))
        .collect()
}

/// Triggers the stop signal when the owning thread unwinds.
struct StopOnPanic(StopSignal);

impl Drop for StopOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.trigger();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
