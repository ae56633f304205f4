//! Data Transfer Objects decoded from Hop server responses
//!
//! Every servlet answers with an XML document. The records here are the
//! typed view of those documents; conversion fails fast when a field the
//! caller depends on is missing.

pub mod server;
pub mod status;
pub mod webresult;

pub use server::{ExecutionSummary, ServerStatus};
pub use status::StatusSnapshot;
pub use webresult::{RegisterResult, WebResult};
