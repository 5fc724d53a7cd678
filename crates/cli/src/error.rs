//! Error types for CLI operations.

use std::path::{Path, PathBuf};

use contracts::ContractError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ContractError),

    #[error("Invalid argument --{arg}: {message}")]
    InvalidArgument { arg: &'static str, message: String },

    #[error("Failed to load replay '{path}': {source}")]
    Replay {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read snapshot '{path}': {message}")]
    SnapshotRead { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn invalid_argument(arg: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            message: message.into(),
        }
    }

    pub fn replay(path: &Path, source: std::io::Error) -> Self {
        Self::Replay {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn snapshot_read(path: &Path, message: impl Into<String>) -> Self {
        Self::SnapshotRead {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
