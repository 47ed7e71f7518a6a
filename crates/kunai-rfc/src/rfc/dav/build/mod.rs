//! Multistatus response building.

mod merge;
mod multistatus;

pub use merge::{MergeError, merge_multistatus};
pub use multistatus::{
    build_propname_response, build_response, build_status_response, empty_multistatus,
};
