//! Run configuration and fixed constants.
//!
//! A [`Config`] is built once at startup (see [`crate::args`]) and passed by
//! reference into both pipelines.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Project used when `--project` is not given.
pub const DEFAULT_PROJECT: &str = "gcping-1369";
/// Output file used when `--out` is not given.
pub const DEFAULT_OUT_FILE: &str = "config.js";

/// Name of the subnet created in every region.
pub const SUBNET_NAME: &str = "subnet";
/// Name of the pre-existing network the subnets attach to.
pub const NETWORK_NAME: &str = "network";
/// Create attempts per region before giving up.
pub const MAX_SUBNET_ATTEMPTS: usize = 40;
/// Second octet of the first candidate `10.x.0.0/20` block.
pub const CIDR_FIRST_OCTET: u8 = 22;
/// Increment of the second octet after each failed attempt.
pub const CIDR_OCTET_STEP: u8 = 2;
/// Prefix length of every candidate block.
pub const CIDR_PREFIX_LEN: u8 = 20;

/// Run service name that is published in the config.
pub const RUN_SERVICE_NAME: &str = "ping";
/// Bucket naming convention of the project.
pub const BUCKET_PREFIX: &str = "gcping-";
/// Public host serving bucket objects.
pub const STORAGE_PUBLIC_HOST: &str = "https://storage.googleapis.com";

pub const HTTP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_CONCURRENCY: usize = 4;

pub const DEFAULT_COMPUTE_API: &str = "https://www.googleapis.com/compute/v1";
pub const DEFAULT_RUN_API: &str = "https://run.googleapis.com/v1";
pub const DEFAULT_STORAGE_API: &str = "https://storage.googleapis.com/storage/v1";

/// Base URLs of the three control planes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub compute: String,
    pub run: String,
    pub storage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            compute: DEFAULT_COMPUTE_API.to_string(),
            run: DEFAULT_RUN_API.to_string(),
            storage: DEFAULT_STORAGE_API.to_string(),
        }
    }
}

impl Endpoints {
    /// Point all three control planes at one base URL, e.g. a mock server.
    pub fn with_base(base: &str) -> Endpoints {
        let base = base.trim_end_matches('/');
        Endpoints {
            compute: format!("{base}/compute/v1"),
            run: format!("{base}/run/v1"),
            storage: format!("{base}/storage/v1"),
        }
    }
}

/// Stand-in printed wherever a credential would show up in `Debug` output.
pub const REDACTED: &str = "<redacted>";

/// Immutable settings shared by the provisioner and the discoverer.
#[derive(Clone)]
pub struct Config {
    /// Target project id.
    pub project: String,
    /// Bearer credential sent with every request.
    pub token: String,
    /// Destination of the rendered config.
    pub out_file: PathBuf,
    pub endpoints: Endpoints,
    /// Regions provisioned in parallel.
    pub concurrency: usize,
    /// Upper bound for waiting on one long-running operation.
    pub operation_timeout: Duration,
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(project: &str, token: &str) -> Config {
        Config {
            project: project.to_string(),
            token: token.to_string(),
            out_file: PathBuf::from(DEFAULT_OUT_FILE),
            endpoints: Endpoints::default(),
            concurrency: DEFAULT_CONCURRENCY,
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("project", &self.project)
            .field("token", &REDACTED)
            .field("out_file", &self.out_file)
            .field("endpoints", &self.endpoints)
            .field("concurrency", &self.concurrency)
            .field("operation_timeout", &self.operation_timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
