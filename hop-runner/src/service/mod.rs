//! Service layer
//!
//! Traits the execution poller is written against. The Hop server client
//! implements [`ExecutionApi`]; tests substitute scripted implementations.

mod api;
mod sink;

pub use api::ExecutionApi;
pub use sink::{LogSink, TracingLogSink};
