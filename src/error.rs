//! Error types for both pipelines.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure talking to one of the cloud control planes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {url}: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url}: HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[error("json decode {url}: path={path}: {source}")]
    Decode {
        url: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("page token '{token}' repeated for {url}, possible infinite loop")]
    PageLoop { url: String, token: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// HTTP 409, the resource already exists.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// HTTP 401/403, retrying with another CIDR can't help.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("regions.list: {0}")]
    Regions(#[source] ApiError),
    #[error("subnet.insert ({region}): {source}")]
    Rejected {
        region: String,
        #[source]
        source: ApiError,
    },
    #[error("operation {operation} ({region}): {source}")]
    Wait {
        region: String,
        operation: String,
        #[source]
        source: ApiError,
    },
    #[error("operation {operation} ({region}) failed: {message}")]
    OperationFailed {
        region: String,
        operation: String,
        message: String,
    },
    #[error("operation {operation} ({region}) not done after {timeout:?}")]
    OperationTimeout {
        region: String,
        operation: String,
        timeout: Duration,
    },
}

/// Which discovery source produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Compute,
    Run,
    Storage,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Compute => "compute",
            SourceKind::Run => "run",
            SourceKind::Storage => "storage",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("{kind} addresses: {error}")]
    Fetch {
        kind: SourceKind,
        #[source]
        error: ApiError,
    },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("template: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("render: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("write {sink}: {source}")]
    Write {
        sink: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{} sink(s) failed: {}", .0.len(), join_errors(.0))]
    Sinks(Vec<OutputError>),
}

fn join_errors(errors: &[OutputError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Must provide --tok (or GCPING_TOKEN)")]
    MissingToken,
    #[error("output directory does not exist for {0}")]
    OutputDir(PathBuf),
    #[error("gcloud access token: {0}")]
    TokenCommand(String),
}
