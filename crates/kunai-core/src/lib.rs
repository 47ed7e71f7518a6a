//! Shared configuration, constants and error types for the kunai CalDAV server.

pub mod config;
pub mod constants;
pub mod error;
