//! Compute Engine bindings: regions, subnetworks, operations and addresses.

use super::http::{GcpClient, Paged};
use crate::error::{ApiError, ProvisionError};
use crate::models::{Address, Operation, Subnetwork};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// The compute control plane as seen by the provisioner.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Names of all regions of the project.
    async fn list_regions(&self) -> Result<Vec<String>, ApiError>;

    /// Start a `subnetworks.insert` in `region`.
    async fn insert_subnetwork(
        &self,
        region: &str,
        subnet: &Subnetwork,
    ) -> Result<Operation, ApiError>;

    /// Block until `operation` in `region` is done.
    async fn wait_region_operation(
        &self,
        region: &str,
        operation: &Operation,
    ) -> Result<(), ProvisionError>;
}

/// [`ComputeApi`] backed by the compute REST API.
pub struct RestCompute {
    client: GcpClient,
    project: String,
    operation_timeout: Duration,
    poll_interval: Duration,
}

impl RestCompute {
    pub fn new(
        client: GcpClient,
        project: &str,
        operation_timeout: Duration,
        poll_interval: Duration,
    ) -> RestCompute {
        RestCompute {
            client,
            project: project.to_string(),
            operation_timeout,
            poll_interval,
        }
    }

    fn region_url(&self, region: &str, resource: &str) -> String {
        format!(
            "{}/projects/{}/regions/{region}/{resource}",
            self.client.endpoints.compute, self.project
        )
    }

    /// Poll `operation` until it is done, without any bound of its own.
    async fn poll_operation(
        &self,
        region: &str,
        operation: &Operation,
    ) -> Result<(), ProvisionError> {
        let url = self.region_url(region, &format!("operations/{}", operation.name));
        let mut current = operation.clone();
        loop {
            if current.is_done() {
                return match current.error_message() {
                    Some(message) => Err(ProvisionError::OperationFailed {
                        region: region.to_string(),
                        operation: operation.name.clone(),
                        message,
                    }),
                    None => Ok(()),
                };
            }
            log::debug!(
                "operation {} ({region}) status={}, waiting {:?}",
                operation.name,
                current.status,
                self.poll_interval
            );
            tokio::time::sleep(self.poll_interval).await;
            current = self
                .client
                .get_json(&url, &[])
                .await
                .map_err(|source| ProvisionError::Wait {
                    region: region.to_string(),
                    operation: operation.name.clone(),
                    source,
                })?;
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RegionList {
    #[serde(default)]
    items: Vec<RegionItem>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RegionItem {
    name: String,
}

impl Paged for RegionList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl ComputeApi for RestCompute {
    async fn list_regions(&self) -> Result<Vec<String>, ApiError> {
        let url = format!(
            "{}/projects/{}/regions",
            self.client.endpoints.compute, self.project
        );
        let pages: Vec<RegionList> = self.client.get_pages(&url, &[]).await?;
        Ok(pages
            .into_iter()
            .flat_map(|p| p.items.into_iter().map(|r| r.name))
            .collect())
    }

    async fn insert_subnetwork(
        &self,
        region: &str,
        subnet: &Subnetwork,
    ) -> Result<Operation, ApiError> {
        self.client
            .post_json(&self.region_url(region, "subnetworks"), subnet)
            .await
    }

    async fn wait_region_operation(
        &self,
        region: &str,
        operation: &Operation,
    ) -> Result<(), ProvisionError> {
        // the bound covers slow polls too, not just the sleeps between them
        tokio::time::timeout(self.operation_timeout, self.poll_operation(region, operation))
            .await
            .unwrap_or_else(|_| {
                Err(ProvisionError::OperationTimeout {
                    region: region.to_string(),
                    operation: operation.name.clone(),
                    timeout: self.operation_timeout,
                })
            })
    }
}

/// Aggregated address listing: region key to reserved addresses.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedAddressList {
    #[serde(default)]
    pub items: BTreeMap<String, AddressesScopedList>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AddressesScopedList {
    #[serde(default)]
    pub addresses: Vec<ReservedAddress>,
}

#[derive(Deserialize, Debug)]
pub struct ReservedAddress {
    pub address: String,
}

impl Paged for AggregatedAddressList {
    fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Turn one aggregated page into `{region, http://<first address>}` records.
///
/// Regions with an empty address list are skipped.
pub fn normalize_addresses(list: AggregatedAddressList) -> Vec<Address> {
    list.items
        .into_iter()
        .filter_map(|(key, scoped)| {
            let region = key.strip_prefix("regions/").unwrap_or(&key).to_string();
            match scoped.addresses.first() {
                Some(first) => {
                    Some(Address::new(region, format!("http://{}", first.address)))
                }
                None => {
                    log::debug!("no reserved address in {key}, skipping");
                    None
                }
            }
        })
        .collect()
}

/// Fold all pages into one listing.
///
/// A scope key can show up on more than one page; its address lists are
/// appended in page order so the first page keeps the first address.
pub fn merge_address_pages(pages: Vec<AggregatedAddressList>) -> AggregatedAddressList {
    let mut merged = AggregatedAddressList::default();
    for page in pages {
        for (key, scoped) in page.items {
            merged
                .items
                .entry(key)
                .or_default()
                .addresses
                .extend(scoped.addresses);
        }
    }
    merged
}

/// Fetch the reserved addresses of every region of `project`.
pub async fn compute_addresses(
    client: &GcpClient,
    project: &str,
) -> Result<Vec<Address>, ApiError> {
    let url = format!(
        "{}/projects/{project}/aggregated/addresses",
        client.endpoints.compute
    );
    let pages: Vec<AggregatedAddressList> = client.get_pages(&url, &[]).await?;
    let addresses = normalize_addresses(merge_address_pages(pages));
    log::info!("compute: {} addresses", addresses.len());
    Ok(addresses)
}
