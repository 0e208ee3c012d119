//! # Diagnostics
//!
//! The table's diagnostics (seating, deadline, shutdown, per-philosopher spans) go
//! through `tracing` to **stderr**. Stdout is reserved for the event lines written by
//! the [`LogWriter`](crate::event_log::LogWriter), so the two streams never mix.
//!
//! ## Configuration
//!
//! Verbosity comes from `RUST_LOG`; nothing is printed when it is unset.
//!
//! ```bash
//! # Seating, deadline and shutdown
//! RUST_LOG=info dining-philosophers 5 10
//!
//! # Plus each philosopher's fork order and meal count
//! RUST_LOG=debug dining-philosophers 5 10
//!
//! # Every state transition and fork hand-off
//! RUST_LOG=trace dining-philosophers 5 10
//! ```
//!
//! Philosopher threads run inside a `philosopher{id=..}` span, so compact output reads
//! `DEBUG philosopher{id=3}: Seated left=3 right=4 order=[Right, Left]`.

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
