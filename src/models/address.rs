//! Unified discovery record.

use serde::{Deserialize, Serialize};

/// A region label paired with the base URL of its ping endpoint.
///
/// `ip` holds a bare `http://<ip>` for compute addresses and a full URL for
/// run services and buckets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub region: String,
    pub ip: String,
}

impl Address {
    pub fn new(region: impl Into<String>, ip: impl Into<String>) -> Address {
        Address {
            region: region.into(),
            ip: ip.into(),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} -> {}", self.region, self.ip)
    }
}
