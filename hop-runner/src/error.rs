//! Error types for running an execution

use std::time::Duration;

use hop_client::ClientError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExecutionError>;

#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A server call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The execution reached a terminal status other than `Finished`
    #[error("execution ended with status {status}")]
    ExecutionFailed {
        status: String,
        error_desc: Option<String>,
    },

    /// The `logging_string` of a status poll could not be decoded
    #[error("failed to decode execution log: {0}")]
    LogDecode(String),

    #[error("execution cancelled")]
    Cancelled,

    #[error("execution exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl ExecutionError {
    pub(crate) fn log_decode(e: impl std::fmt::Display) -> Self {
        Self::LogDecode(e.to_string())
    }
}
