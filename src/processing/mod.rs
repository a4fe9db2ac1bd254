//! The two pipelines.
//!
//! - [`provision`] - per-region subnet creation loop
//! - [`discover`] - three-source endpoint discovery and merge

pub mod discover;
pub mod provision;

// Re-export public functions
pub use discover::{discover, duplicate_regions, merge_addresses};
pub use provision::{
    create_subnet, provision_all, provision_regions, ProvisionOutcome, ProvisionReport,
};
