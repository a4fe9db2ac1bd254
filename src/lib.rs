// cargo watch -x 'fmt' -x 'run -- regen --tok ...'

pub mod args;
pub mod config;
pub mod error;
pub mod gcp;
pub mod models;
pub mod output;
pub mod processing;

use config::Config;
use gcp::{GcpClient, RestCompute};
use models::Address;
use processing::ProvisionReport;
use std::error::Error;

/// Discover all ping endpoints, render the config and write it to stdout and
/// `config.out_file`.
///
/// Nothing is written unless all three sources were fetched successfully.
pub async fn run_regen(config: &Config) -> Result<Vec<Address>, Box<dyn Error>> {
    let client = GcpClient::from_config(config)?;
    let addresses = processing::discover(&client, &config.project).await?;
    let rendered = output::render_config(&addresses)?;
    output::write_config(&rendered, &config.out_file)?;
    Ok(addresses)
}

/// Make sure every region of the project has its subnet.
///
/// Returns an error after all regions ran if any of them failed.
pub async fn run_networks(config: &Config) -> Result<ProvisionReport, Box<dyn Error>> {
    let client = GcpClient::from_config(config)?;
    let compute = RestCompute::new(
        client,
        &config.project,
        config.operation_timeout,
        config.poll_interval,
    );
    let report = processing::provision_all(&compute, &config.project, config.concurrency).await?;
    output::print_report(&report);

    let failed = report.failed();
    if !failed.is_empty() {
        return Err(format!("subnet provisioning failed in: {}", failed.join(", ")).into());
    }
    Ok(report)
}
