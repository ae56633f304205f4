//! Hop Runner
//!
//! Runs Apache Hop pipelines and workflows on a remote Hop server.
//!
//! Architecture:
//! - Configuration: connection, project and polling settings
//! - Services: the execution lifecycle as a trait over the server client,
//!   and sinks for decoded log lines
//! - Scheduler: the poll loop driving one execution to a terminal status
//! - Log: decoding of the compressed execution log
//!
//! The runner registers a job from the local project, starts it, and polls
//! its status until it finishes, relaying new log lines after every poll.

pub mod config;
pub mod error;
pub mod log;
pub mod scheduler;
pub mod service;

pub use config::Config;
pub use error::{ExecutionError, Result};
pub use log::{LogChunk, decode_log};
pub use scheduler::{ExecutionPoller, ExecutionReport, PollerConfig};
pub use service::{ExecutionApi, LogSink, TracingLogSink};
