//! Hop Core
//!
//! Core types shared by the Hop server bridge crates.
//!
//! This crate contains:
//! - Domain types: variables, job specs, execution handles and statuses
//! - DTOs: typed records decoded from Hop server XML responses
//! - A small XML element tree used both to build request payloads and to
//!   read server responses

pub mod domain;
pub mod dto;
pub mod error;
pub mod xml;

pub use error::{CoreError, Result};
