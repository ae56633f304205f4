//! Error types for project resolution and payload building

use std::path::PathBuf;

use hop_core::CoreError;
use hop_core::domain::job::JobKind;
use thiserror::Error;

/// Result type alias for project operations
pub type Result<T> = std::result::Result<T, ProjectError>;

/// Errors raised while reading project configuration or building payloads
#[derive(Debug, Error)]
pub enum ProjectError {
    /// A project or environment is not declared in `hop-config.json`,
    /// or a configuration document has an unexpected shape
    #[error("Configuration error: {0}")]
    Config(String),

    /// The pipeline or workflow definition file does not exist
    #[error("{kind} {} not found", .path.display())]
    NotFound { kind: JobKind, path: PathBuf },

    /// No pipeline run configuration with this name exists in the metastore
    #[error("Pipeline configuration {0} not found")]
    RunConfigNotFound(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid XML in {}: {source}", .path.display())]
    Xml { path: PathBuf, source: CoreError },

    /// Assembling the payload document failed
    #[error("Failed to build payload: {0}")]
    Payload(String),
}

impl ProjectError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a missing definition or run configuration
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::RunConfigNotFound(_))
    }
}
