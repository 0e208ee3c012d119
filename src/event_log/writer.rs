//! # Log Writer
//!
//! The "server" half of the event log owns the sink and the receiving end of the
//! channel. Lines are written strictly in the order they were sent, one complete line
//! per write.
//!
//! ## Shutdown
//!
//! The writer stops when every [`LogClient`] has been dropped. The table drops its
//! philosophers (and with them their clients) when they finish dining, so the binary
//! only has to drop its own client and await the writer to flush everything.

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Destination for complete log lines.
#[async_trait]
pub trait LineSink: Send + 'static {
    /// Writes `line` followed by a newline as a single unit.
    async fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Writes lines to the process's standard output.
pub struct StdoutSink {
    out: tokio::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSink for StdoutSink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        self.out.write_all(&buf).await?;
        self.out.flush().await
    }
}

/// The task that owns the sink and serializes every line.
pub struct LogWriter {
    receiver: mpsc::UnboundedReceiver<String>,
}

impl LogWriter {
    /// Creates the writer and the first client handle.
    ///
    /// The channel is unbounded: philosophers log from blocking threads and must
    /// never park on the logger while holding forks.
    pub fn new() -> (Self, LogClient) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { receiver }, LogClient { sender })
    }

    /// Drains the channel into `sink` until every client is gone.
    ///
    /// Returns the number of lines written. A failing sink ends the loop early; the
    /// remaining lines are discarded.
    pub async fn run<S: LineSink>(mut self, mut sink: S) -> usize {
        info!("Log writer started");
        let mut written = 0;

        while let Some(line) = self.receiver.recv().await {
            if let Err(e) = sink.write_line(&line).await {
                error!(error = %e, written, "Log sink failed");
                break;
            }
            written += 1;
        }

        info!(written, "Log writer shutdown");
        written
    }
}

/// Handle used to submit lines to the [`LogWriter`].
#[derive(Debug, Clone)]
pub struct LogClient {
    sender: mpsc::UnboundedSender<String>,
}

impl LogClient {
    /// Queues one line. Never blocks.
    pub fn log(&self, line: impl Into<String>) {
        if self.sender.send(line.into()).is_err() {
            debug!("Log writer closed, line dropped");
        }
    }
}
