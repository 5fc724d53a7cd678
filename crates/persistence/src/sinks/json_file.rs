//! JsonFileSink - replaces one pretty-printed JSON snapshot atomically

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use contracts::{CaptureSnapshot, ContractError, SnapshotSink};
use tracing::{debug, info, instrument, warn};

use crate::atomic::write_atomically;
use crate::PersistenceError;

/// Sink that keeps the latest snapshot in a single JSON file
pub struct JsonFileSink {
    name: String,
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and atomically replace the file, returning the byte count
    pub fn write_snapshot(&self, snapshot: &CaptureSnapshot) -> Result<u64, PersistenceError> {
        write_atomically(&self.path, |writer| {
            serde_json::to_writer_pretty(&mut *writer, snapshot).map_err(|source| {
                PersistenceError::Serialize {
                    path: self.path.clone(),
                    source,
                }
            })?;
            writer
                .write_all(b"\n")
                .map_err(|e| PersistenceError::io("write", &self.path, e))
        })
    }

    fn ensure_dir(&self) -> Result<(), PersistenceError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .map_err(|e| PersistenceError::io("create_dir", dir, e)),
            _ => Ok(()),
        }
    }

    fn existing_is_valid(&self) -> Result<bool, PersistenceError> {
        let bytes = fs::read(&self.path).map_err(|e| PersistenceError::io("read", &self.path, e))?;
        Ok(serde_json::from_slice::<serde_json::Value>(&bytes).is_ok())
    }
}

impl SnapshotSink for JsonFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> Option<&Path> {
        Some(&self.path)
    }

    #[instrument(
        name = "json_sink_initialize",
        skip(self, empty),
        fields(sink = %self.name, path = %self.path.display())
    )]
    fn initialize(&mut self, empty: &CaptureSnapshot) -> Result<(), ContractError> {
        self.ensure_dir()?;

        if self.path.exists() {
            if !self.existing_is_valid()? {
                warn!("Existing snapshot is not valid JSON, it will be replaced on the next write");
            } else {
                debug!("Keeping existing snapshot");
            }
            return Ok(());
        }

        let bytes = self.write_snapshot(empty)?;
        info!(bytes, "Created empty snapshot");
        Ok(())
    }

    #[instrument(
        name = "json_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name, samples = snapshot.telemetry.len())
    )]
    fn write(&mut self, snapshot: &CaptureSnapshot) -> Result<(), ContractError> {
        let bytes = self.write_snapshot(snapshot)?;
        debug!(bytes, path = %self.path.display(), "Snapshot written");
        Ok(())
    }
}
