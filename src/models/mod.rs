//! Domain models for gcping infrastructure.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Ipv4`] and [`CidrAllocator`] - CIDR blocks for subnet provisioning
//! - [`Subnetwork`] and [`Operation`] - compute API payloads
//! - [`Address`] - region to ping endpoint record

mod address;
mod ipv4;
mod operation;
mod subnet;

// Re-export public types
pub use address::Address;
pub use ipv4::{CidrAllocator, Ipv4, MAX_LENGTH};
pub use operation::{Operation, OperationError, OperationErrorItem};
pub use subnet::Subnetwork;
