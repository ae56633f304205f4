//! Hop project resolution and request payloads
//!
//! This crate reads a Hop installation's static configuration from disk and
//! turns pipeline/workflow definitions into the registration documents the
//! Hop server expects. It includes:
//! - Config resolution: global, project and environment variables
//! - Metastore loading and encoding from the project metadata tree
//! - Definition parsing (declared parameters)
//! - The XML payload builder

pub mod config;
pub mod definition;
pub mod error;
pub mod metastore;
pub mod payload;

pub use config::{ProjectConfig, ProjectSettings};
pub use error::{ProjectError, Result};
pub use metastore::Metastore;
pub use payload::PayloadBuilder;
