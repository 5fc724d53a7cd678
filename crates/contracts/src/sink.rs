//! SnapshotSink trait - Persistence Writer interface
//!
//! Defines the abstract interface for snapshot writers.

use std::path::Path;

use crate::{CaptureSnapshot, ContractError};

/// Snapshot output trait
///
/// All writer implementations must implement this trait. A write replaces
/// the previously persisted snapshot in full.
pub trait SnapshotSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Destination file, if the sink persists to one
    fn target(&self) -> Option<&Path> {
        None
    }

    /// Prepare the destination; writes `empty` when nothing is persisted yet
    fn initialize(&mut self, empty: &CaptureSnapshot) -> Result<(), ContractError>;

    /// Write snapshot
    ///
    /// # Errors
    /// Returns `Persistence` error; the previous snapshot must stay intact
    fn write(&mut self, snapshot: &CaptureSnapshot) -> Result<(), ContractError>;

    /// Flush pending work (if any)
    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    /// Close sink
    fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
