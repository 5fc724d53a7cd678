//! Persistence error types

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Persistence-specific errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Snapshot could not be serialized
    #[error("failed to serialize snapshot for '{path}': {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem operation failed
    #[error("{op} failed for '{path}': {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writer thread could not be started or has stopped
    #[error("writer '{name}' unavailable: {message}")]
    Worker { name: String, message: String },
}

impl PersistenceError {
    pub(crate) fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Destination the failed operation targeted
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Serialize { path, .. } | Self::Io { path, .. } => Some(path),
            Self::Worker { .. } => None,
        }
    }
}

impl From<PersistenceError> for contracts::ContractError {
    fn from(err: PersistenceError) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        contracts::ContractError::persistence(path, err.to_string())
    }
}
