//! Event log shared by every philosopher.
//!
//! The log is a tiny actor: a single [`LogWriter`] task owns the output sink and
//! receives whole lines over a channel, while each philosopher holds a cheap
//! [`LogClient`] handle. Because only one task ever writes, concurrent lines can never
//! interleave inside one another.
//!
//! # Main Components
//!
//! - [`LogWriter`] / [`LogClient`] - the writer task and its handle
//! - [`LineSink`] - where the writer puts lines ([`StdoutSink`] in the binary)
//! - [`capture`] - an in-memory sink for tests

pub mod capture;
pub mod writer;

pub use capture::*;
pub use writer::*;
