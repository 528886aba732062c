use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackfillError>;

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write marker to {path}: {source}")]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed: {stderr}")]
    CommitFailed { command: String, stderr: String },
}

/// Problems with the identity or generation settings. Always raised before
/// anything touches the filesystem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please set the {0} environment variable")]
    MissingVar(&'static str),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
