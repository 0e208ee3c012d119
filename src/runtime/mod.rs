//! Runtime orchestration and lifecycle management.
//!
//! This module contains the pieces that bring a table to life:
//!
//! - **Seating**: building the fork ring and wiring each philosopher to its neighbours
//! - **Supervision**: launching philosopher threads and the deadline timer, then joining them
//! - **Observability setup**: initializing tracing on stderr
//!
//! # Main Components
//!
//! - [`DiningTable`] - the coordinator that owns the forks, philosophers and stop signal
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod table;
pub mod tracing;

pub use table::*;
pub use self::tracing::*;
