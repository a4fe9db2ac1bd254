//! Google Cloud API interaction.
//!
//! This module handles all cloud-facing operations:
//! - [`cli`] - gcloud command execution (access token)
//! - [`http`] - authenticated JSON client with pagination
//! - [`compute`] - regions, subnetworks, operations, reserved addresses
//! - [`run`] - Cloud Run services
//! - [`storage`] - Cloud Storage buckets

pub mod cli;
pub mod compute;
pub mod http;
pub mod run;
pub mod storage;

// Re-export public types and functions
pub use compute::{compute_addresses, ComputeApi, RestCompute};
pub use http::GcpClient;
pub use run::run_addresses;
pub use storage::storage_addresses;
