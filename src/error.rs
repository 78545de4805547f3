use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a rendered page. Recovered by the traversal engine:
/// only the current page (or pagination chain) is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("timeout after {secs}s while loading {url}")]
    Timeout { url: String, secs: u64 },

    #[error("failed to load {url}: {reason}")]
    Failed { url: String, reason: String },
}

/// Failure to persist the result table. Always fatal for the run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write CSV to {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading or validating a crawler configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("base origin {0:?} must be an absolute URL with a host")]
    InvalidOrigin(String),

    #[error("pagination delay range is empty: min {min_ms}ms > max {max_ms}ms")]
    InvalidDelay { min_ms: u64, max_ms: u64 },

    #[error("invalid link exclude pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Run-level error. The binary maps every variant to a non-zero exit code.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not start a WebDriver session at {url}: {reason}")]
    WebDriver { url: String, reason: String },

    #[error(transparent)]
    Sink(#[from] SinkError),
}
