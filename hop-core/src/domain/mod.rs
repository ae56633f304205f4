//! Core domain types
//!
//! This module contains the structures shared by the payload builder, the
//! server client and the execution poller.

pub mod job;
pub mod status;
pub mod variable;
