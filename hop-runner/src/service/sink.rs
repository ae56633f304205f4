//! Destinations for execution progress
//!
//! A sink receives everything the poller reports about an execution: the
//! status seen on every poll, the decoded log lines, and the diagnostics of
//! a failed execution.

use tracing::{error, info};

/// Receives the progress of an execution as it is polled
pub trait LogSink: Send + Sync {
    /// Writes one log line
    ///
    /// # Arguments
    /// * `job` - Name the execution was registered under
    /// * `line` - A single decoded log line, without line break
    fn write(&mut self, job: &str, line: &str);

    /// Reports the status observed by one poll
    fn status(&mut self, job: &str, id: &str, status: &str);

    /// Reports why an execution failed
    fn error(&mut self, job: &str, message: &str);
}

/// Log sink that forwards everything to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn write(&mut self, job: &str, line: &str) {
        info!(job = %job, "{}", line);
    }

    fn status(&mut self, job: &str, id: &str, status: &str) {
        info!("{}: {}, with id {}", status, job, id);
    }

    fn error(&mut self, job: &str, message: &str) {
        error!(job = %job, "{}", message);
    }
}
