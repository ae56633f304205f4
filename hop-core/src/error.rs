//! Error types for the core crate

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while reading XML documents or decoding them into records
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document is not well-formed XML
    #[error("Malformed XML: {0}")]
    Malformed(String),

    /// Writing the document failed
    #[error("Failed to write XML: {0}")]
    Write(String),

    /// The document root is not the element we expected
    #[error("Unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot {
        expected: String,
        found: String,
    },

    /// A required child element is absent
    #[error("Missing <{field}> in <{element}>")]
    MissingField { element: String, field: String },
}

impl CoreError {
    pub fn malformed(message: impl std::fmt::Display) -> Self {
        Self::Malformed(message.to_string())
    }

    pub fn missing_field(element: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            element: element.into(),
            field: field.into(),
        }
    }
}
