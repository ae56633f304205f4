//! Scheduler layer for the runner
//!
//! Drives one execution from registration to a terminal status, relaying
//! its log as it goes.

pub mod poller;

pub use poller::{ExecutionPoller, ExecutionReport, PollerConfig};
