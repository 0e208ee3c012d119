//! # Captured Output
//!
//! Utilities for testing code that logs through a [`LogClient`] without touching
//! stdout.
//!
//! Use [`CapturedLog::start`] to get a running writer backed by memory, hand out its
//! [`client`](CapturedLog::client), then call [`finish`](CapturedLog::finish) once
//! every other client has been dropped to collect the lines.

use crate::event_log::{LineSink, LogClient, LogWriter};
use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// A [`LineSink`] that keeps every line in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LineSink for CaptureSink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
        Ok(())
    }
}

/// A log writer running on the current Tokio runtime, writing into memory.
pub struct CapturedLog {
    client: LogClient,
    sink: CaptureSink,
    handle: JoinHandle<usize>,
}

impl CapturedLog {
    /// Spawns the writer task. Must be called inside a Tokio runtime.
    pub fn start() -> Self {
        let (writer, client) = LogWriter::new();
        let sink = CaptureSink::new();
        let handle = tokio::spawn(writer.run(sink.clone()));

        Self {
            client,
            sink,
            handle,
        }
    }

    pub fn client(&self) -> LogClient {
        self.client.clone()
    }

    /// Drops the capture's own client, waits for the writer to drain and returns every
    /// captured line.
    ///
    /// Hangs if another [`LogClient`] is still alive.
    pub async fn finish(self) -> Vec<String> {
        drop(self.client);
        if let Err(e) = self.handle.await {
            panic!("Log writer task failed: {:?}", e);
        }
        self.sink.lines()
    }
}
