//! Command line surface.

use crate::config::{
    Config, Endpoints, DEFAULT_COMPUTE_API, DEFAULT_CONCURRENCY, DEFAULT_OPERATION_TIMEOUT_SECS,
    DEFAULT_OUT_FILE, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PROJECT, DEFAULT_RUN_API,
    DEFAULT_STORAGE_API,
};
use crate::error::ConfigError;
use crate::gcp::cli;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gcping-infra")]
#[command(
    about = "Provision gcping subnets and regenerate the ping endpoint config",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Project to use
    #[arg(long, env = "GCPING_PROJECT", default_value = DEFAULT_PROJECT, global = true)]
    pub project: String,

    /// Auth token
    #[arg(long, env = "GCPING_TOKEN", hide_env_values = true, global = true)]
    pub tok: Option<String>,

    #[arg(
        long,
        env = "GCPING_COMPUTE_API",
        default_value = DEFAULT_COMPUTE_API,
        global = true,
        hide = true
    )]
    pub compute_api: String,

    #[arg(
        long,
        env = "GCPING_RUN_API",
        default_value = DEFAULT_RUN_API,
        global = true,
        hide = true
    )]
    pub run_api: String,

    #[arg(
        long,
        env = "GCPING_STORAGE_API",
        default_value = DEFAULT_STORAGE_API,
        global = true,
        hide = true
    )]
    pub storage_api: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Create the per-region subnet in every region
    Networks {
        /// Regions provisioned in parallel
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Seconds to wait for one subnet operation
        #[arg(long, default_value_t = DEFAULT_OPERATION_TIMEOUT_SECS)]
        op_timeout: u64,

        /// Seconds between operation polls
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
        poll_interval: u64,
    },
    /// Discover ping endpoints and write the config file
    Regen {
        /// Output file
        #[arg(long, default_value = DEFAULT_OUT_FILE)]
        out: PathBuf,
    },
}

impl Cli {
    /// Validate the arguments and build the run [`Config`].
    ///
    /// `regen` requires `--tok`; `networks` falls back to gcloud.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let token = match (&self.command, self.tok.filter(|t| !t.is_empty())) {
            (_, Some(token)) => token,
            (Commands::Regen { .. }, None) => return Err(ConfigError::MissingToken),
            (Commands::Networks { .. }, None) => {
                log::info!("no --tok given, asking gcloud for an access token");
                cli::access_token()?
            }
        };

        let mut config = Config::new(&self.project, &token);
        config.endpoints = Endpoints {
            compute: self.compute_api,
            run: self.run_api,
            storage: self.storage_api,
        };

        match self.command {
            Commands::Networks {
                concurrency,
                op_timeout,
                poll_interval,
            } => {
                config.concurrency = concurrency;
                config.operation_timeout = Duration::from_secs(op_timeout);
                config.poll_interval = Duration::from_secs(poll_interval);
            }
            Commands::Regen { out } => {
                check_output_dir(&out)?;
                config.out_file = out;
            }
        }
        Ok(config)
    }
}

/// The output file is created late; make sure its directory is there up front.
fn check_output_dir(out: &Path) -> Result<(), ConfigError> {
    match out.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            Err(ConfigError::OutputDir(out.to_path_buf()))
        }
        _ => Ok(()),
    }
}
