//! LogSink - logs snapshot summary via tracing

use contracts::{CaptureSnapshot, ContractError, SnapshotSink};
use tracing::{info, instrument};

/// Sink that logs snapshot summaries instead of persisting them
pub struct LogSink {
    name: String,
    writes: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            writes: 0,
        }
    }

    /// Snapshots seen so far
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn log_snapshot_summary(&self, snapshot: &CaptureSnapshot) {
        let lap = snapshot.lap_meta.as_ref().map(|m| m.lap);
        let lap_time = snapshot.lap_meta.as_ref().map(|m| m.lap_time);

        info!(
            sink = %self.name,
            lap = ?lap,
            lap_time = ?lap_time,
            samples = snapshot.telemetry.len(),
            lap_complete = snapshot.metadata.lap_complete,
            car = %snapshot.metadata.car_name,
            track = %snapshot.metadata.track_name,
            "Snapshot received"
        );
    }
}

impl SnapshotSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, empty: &CaptureSnapshot) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            car = %empty.metadata.car_name,
            track = %empty.metadata.track_name,
            "LogSink ready"
        );
        Ok(())
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, snapshot),
        fields(sink = %self.name)
    )]
    fn write(&mut self, snapshot: &CaptureSnapshot) -> Result<(), ContractError> {
        self.log_snapshot_summary(snapshot);
        self.writes += 1;
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, writes = self.writes, "LogSink closed");
        Ok(())
    }
}
