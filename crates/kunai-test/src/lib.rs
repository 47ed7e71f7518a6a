//! kunai `CalDAV` server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `kunai_test::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    pub use kunai_core::*;
    pub use kunai_service::*;

    pub mod config {
        pub use kunai_app::config::ConfigHandler;
        pub use kunai_core::config::*;
    }

    pub mod middleware {
        pub use kunai_app::middleware::*;
    }

    pub mod storage_handler {
        pub use kunai_app::storage_handler::*;
    }
}

pub mod app {
    pub use kunai_app::app::api;
    pub use kunai_app::error;
}

pub use kunai_rfc as rfc;
