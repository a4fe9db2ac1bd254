//! Compute subnetwork insert body.

use super::Ipv4;
use crate::config::{NETWORK_NAME, SUBNET_NAME};
use serde::{Deserialize, Serialize};

/// Body of a `subnetworks.insert` request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subnetwork {
    /// Name of the subnet.
    pub name: String,
    /// Partial URL of the network the subnet attaches to.
    pub network: String,
    /// CIDR block of the subnet.
    pub ip_cidr_range: Ipv4,
}

impl Subnetwork {
    /// The per-region `subnet` in the project's `network`.
    pub fn new(project: &str, ip_cidr_range: Ipv4) -> Subnetwork {
        Subnetwork {
            name: SUBNET_NAME.to_string(),
            network: format!("projects/{project}/global/networks/{NETWORK_NAME}"),
            ip_cidr_range,
        }
    }
}
