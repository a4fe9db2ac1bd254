//! Cloud Run service listing.

use super::http::GcpClient;
use crate::config::RUN_SERVICE_NAME;
use crate::error::ApiError;
use crate::models::Address;
use serde::Deserialize;
use std::collections::HashMap;

const LOCATION_LABEL: &str = "cloud.googleapis.com/location";

#[derive(Deserialize, Debug, Default)]
pub struct ServiceList {
    #[serde(default)]
    pub items: Vec<Service>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Service {
    #[serde(default)]
    pub metadata: ServiceMetadata,
    #[serde(default)]
    pub status: ServiceStatus,
}

#[derive(Deserialize, Debug, Default)]
pub struct ServiceMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ServiceStatus {
    #[serde(default)]
    pub address: Option<ServiceAddress>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ServiceAddress {
    #[serde(default)]
    pub url: String,
}

/// Keep the `ping` services, labelled `<location>-cloudrun`.
pub fn normalize_services(list: ServiceList) -> Vec<Address> {
    list.items
        .into_iter()
        .filter(|s| s.metadata.name == RUN_SERVICE_NAME)
        .filter_map(|s| {
            let location = s
                .metadata
                .labels
                .get(LOCATION_LABEL)
                .cloned()
                .unwrap_or_default();
            match s.status.address {
                Some(address) if !address.url.is_empty() => {
                    Some(Address::new(format!("{location}-cloudrun"), address.url))
                }
                _ => {
                    log::warn!(
                        "run service {RUN_SERVICE_NAME} in {location} has no url yet, skipping"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Fetch the `ping` services of `project` in all locations.
pub async fn run_addresses(client: &GcpClient, project: &str) -> Result<Vec<Address>, ApiError> {
    let url = format!(
        "{}/projects/{project}/locations/-/services",
        client.endpoints.run
    );
    let list: ServiceList = client.get_json(&url, &[]).await?;
    let addresses = normalize_services(list);
    log::info!("run: {} addresses", addresses.len());
    Ok(addresses)
}
