//! HTTP surface of the kunai `CalDAV` server.
//!
//! Routing, Basic authentication and the per-method handlers. Protocol work
//! is delegated to `kunai-service`.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod storage_handler;
