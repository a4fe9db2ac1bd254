//! Per-region subnet provisioning.
//!
//! Every region gets one subnet named `subnet` in network `network`. The
//! address range is found by trial: `10.22.0.0/20` first, then `10.24.0.0/20`
//! and so on, until the insert is accepted or the attempt budget runs out.

use crate::config::MAX_SUBNET_ATTEMPTS;
use crate::error::ProvisionError;
use crate::gcp::ComputeApi;
use crate::models::{CidrAllocator, Ipv4, Subnetwork};
use colored::Colorize;
use futures::stream::{self, StreamExt};

/// Terminal state of one region's provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The subnet was already there, nothing was created.
    AlreadyExists,
    /// The subnet was created with `cidr` on attempt number `attempts`.
    Created { cidr: Ipv4, attempts: usize },
    /// Every candidate block was refused, the region has no subnet.
    Abandoned { attempts: usize },
}

/// Ensure the subnet exists in `region`.
///
/// A 409 from the insert is success. 401/403 end the region with an error
/// since another range won't fix permissions. Any other insert error moves
/// on to the next candidate block. An accepted insert is waited on, and a
/// failed wait is returned as is.
pub async fn create_subnet<C: ComputeApi + ?Sized>(
    api: &C,
    project: &str,
    region: &str,
) -> Result<ProvisionOutcome, ProvisionError> {
    let mut cidrs = CidrAllocator::new();

    for attempt in 1..=MAX_SUBNET_ATTEMPTS {
        let cidr = cidrs.next();
        let subnet = Subnetwork::new(project, cidr);

        match api.insert_subnetwork(region, &subnet).await {
            Err(e) if e.is_conflict() => {
                log::info!("subnet.create ({region}): already exists");
                return Ok(ProvisionOutcome::AlreadyExists);
            }
            Err(e) if e.is_permission_denied() => {
                log::error!("subnet.insert ({region}) {cidr}: {e}");
                return Err(ProvisionError::Rejected {
                    region: region.to_string(),
                    source: e,
                });
            }
            Err(e) => {
                log::warn!("subnet.insert ({region}) attempt {attempt} {cidr}: {e}");
                continue;
            }
            Ok(operation) => {
                api.wait_region_operation(region, &operation).await?;
                log::info!("subnet.create ({region}): ok {cidr} after {attempt} attempt(s)");
                return Ok(ProvisionOutcome::Created {
                    cidr,
                    attempts: attempt,
                });
            }
        }
    }

    log::warn!(
        "subnet.create ({region}): {} after {MAX_SUBNET_ATTEMPTS} attempts",
        "abandoned".on_red()
    );
    Ok(ProvisionOutcome::Abandoned {
        attempts: MAX_SUBNET_ATTEMPTS,
    })
}

/// Per-region results of a provisioning run, sorted by region.
#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub results: Vec<(String, Result<ProvisionOutcome, ProvisionError>)>,
}

impl ProvisionReport {
    pub fn failed(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(region, _)| region.as_str())
            .collect()
    }

    pub fn abandoned(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, Ok(ProvisionOutcome::Abandoned { .. })))
            .map(|(region, _)| region.as_str())
            .collect()
    }
}

/// Provision `regions`, at most `concurrency` at a time.
///
/// Each region runs its own attempt sequence; an error in one region never
/// stops the others.
pub async fn provision_regions<C: ComputeApi + ?Sized>(
    api: &C,
    project: &str,
    regions: Vec<String>,
    concurrency: usize,
) -> ProvisionReport {
    let mut results: Vec<(String, Result<ProvisionOutcome, ProvisionError>)> =
        stream::iter(regions)
            .map(|region| async move {
                let result = create_subnet(api, project, &region).await;
                if let Err(e) = &result {
                    log::error!("{failed} {e}", failed = "failed".on_red());
                }
                (region, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

    results.sort_by(|a, b| a.0.cmp(&b.0));
    ProvisionReport { results }
}

/// List the project's regions and provision all of them.
pub async fn provision_all<C: ComputeApi + ?Sized>(
    api: &C,
    project: &str,
    concurrency: usize,
) -> Result<ProvisionReport, ProvisionError> {
    let regions = api.list_regions().await.map_err(ProvisionError::Regions)?;
    log::info!("provisioning {} regions of {project}", regions.len());
    Ok(provision_regions(api, project, regions, concurrency).await)
}
