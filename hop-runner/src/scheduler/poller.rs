//! Execution poller
//!
//! Registers a job, starts it and polls its status until the server reports
//! a terminal status. New log lines from every poll are written to the
//! configured sink. Calls are strictly sequential: each one completes
//! before the next is issued.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hop_core::domain::job::{ExecutionHandle, JobSpec};
use hop_core::domain::status::ExecutionStatus;
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::{ExecutionError, Result};
use crate::log::decode_log;
use crate::service::{ExecutionApi, LogSink, TracingLogSink};

/// Polling behaviour of one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between two status polls
    pub poll_interval: Duration,

    /// Stop the execution once it has run this long
    pub deadline: Option<Duration>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

/// Outcome of an execution that finished cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub handle: ExecutionHandle,
    pub final_status: ExecutionStatus,
    /// Log lines written to the sink, debug lines excluded
    pub lines_emitted: usize,
    /// Number of status polls performed
    pub polls: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Why the poller woke up between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Poll,
    Cancelled,
    DeadlineExceeded,
}

/// Runs executions against an [`ExecutionApi`]
pub struct ExecutionPoller {
    api: Arc<dyn ExecutionApi>,
    config: PollerConfig,
    sink: Box<dyn LogSink>,
}

impl ExecutionPoller {
    /// Creates a poller that writes log lines through `tracing`
    pub fn new(api: Arc<dyn ExecutionApi>, config: PollerConfig) -> Self {
        Self::with_sink(api, config, Box::new(TracingLogSink))
    }

    pub fn with_sink(
        api: Arc<dyn ExecutionApi>,
        config: PollerConfig,
        sink: Box<dyn LogSink>,
    ) -> Self {
        Self { api, config, sink }
    }

    /// Runs a job to completion
    ///
    /// # Errors
    /// - `ExecutionError::Client` if any server call fails
    /// - `ExecutionError::ExecutionFailed` if the execution ends in any
    ///   terminal status other than `Finished`
    /// - `ExecutionError::Cancelled` / `DeadlineExceeded` after the
    ///   execution has been asked to stop
    pub async fn run(
        &mut self,
        spec: &JobSpec,
        cancel: CancellationToken,
    ) -> Result<ExecutionReport> {
        let started_at = Utc::now();
        let handle = self.api.register(spec).await?;
        info!("Registered {}", handle);

        self.api.prepare(&handle).await?;
        self.api.start(&handle).await?;
        info!("Started {}", handle);

        let deadline = self.config.deadline.map(|d| Instant::now() + d);
        let mut cursor = 0;
        let mut lines_emitted = 0;
        let mut polls = 0;

        loop {
            let snapshot = self.api.status(&handle).await?;
            polls += 1;
            self.sink.status(&handle.name, &handle.id, &snapshot.status_desc);

            let chunk = decode_log(&snapshot.logging_string, cursor)?;
            cursor = chunk.cursor;
            for line in &chunk.lines {
                self.sink.write(&handle.name, line);
            }
            lines_emitted += chunk.lines.len();
            debug!("Poll {} of {}: {}", polls, handle, snapshot.status);

            if snapshot.status.is_terminal() {
                if snapshot.status.is_error() {
                    if let Some(error_desc) = &snapshot.error_desc {
                        let message = format!("Error description: {}", error_desc);
                        self.sink.error(&handle.name, &message);
                    }
                    let message = format!("Final status: {}", snapshot.status_desc);
                    self.sink.error(&handle.name, &message);
                    return Err(ExecutionError::ExecutionFailed {
                        status: snapshot.status_desc,
                        error_desc: snapshot.error_desc,
                    });
                }

                let finished_at = Utc::now();
                info!(
                    "{} finished in {}s ({} polls)",
                    handle,
                    (finished_at - started_at).num_seconds(),
                    polls
                );
                return Ok(ExecutionReport {
                    handle,
                    final_status: snapshot.status,
                    lines_emitted,
                    polls,
                    started_at,
                    finished_at,
                });
            }

            match self.pause(&cancel, deadline).await {
                Wake::Poll => {}
                Wake::Cancelled => {
                    warn!("Cancelling {}", handle);
                    self.stop(&handle).await;
                    return Err(ExecutionError::Cancelled);
                }
                Wake::DeadlineExceeded => {
                    let limit = self.config.deadline.unwrap_or_default();
                    warn!("{} exceeded its deadline of {:?}", handle, limit);
                    self.stop(&handle).await;
                    return Err(ExecutionError::DeadlineExceeded(limit));
                }
            }
        }
    }

    /// Sleeps until the next poll, the deadline or cancellation, whichever is first
    async fn pause(&self, cancel: &CancellationToken, deadline: Option<Instant>) -> Wake {
        let next_poll = Instant::now() + self.config.poll_interval;
        let (until, wake) = match deadline {
            Some(deadline) if deadline <= next_poll => (deadline, Wake::DeadlineExceeded),
            _ => (next_poll, Wake::Poll),
        };

        tokio::select! {
            _ = cancel.cancelled() => Wake::Cancelled,
            _ = time::sleep_until(until) => wake,
        }
    }

    async fn stop(&self, handle: &ExecutionHandle) {
        if let Err(e) = self.api.stop(handle).await {
            warn!("Failed to stop {}: {}", handle, e);
        }
    }
}
