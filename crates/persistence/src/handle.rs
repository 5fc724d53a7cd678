//! BackgroundSink - runs a sink on its own writer thread behind a single slot
//!
//! The slot holds at most one pending snapshot. A newer request replaces an
//! older one that has not been picked up yet, so at most one write is in
//! flight and nothing queues up behind a slow disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use contracts::{CaptureSnapshot, ContractError, SnapshotSink};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, instrument, warn};

use crate::metrics::WriterMetrics;
use crate::PersistenceError;

#[derive(Default)]
struct Slot {
    pending: Option<CaptureSnapshot>,
    busy: bool,
    closed: bool,
    last_error: Option<ContractError>,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Slot>,
    /// Signalled when a payload arrives or the writer is closed
    ready: Condvar,
    /// Signalled when the writer has nothing left to do
    idle: Condvar,
}

/// Handle to a sink running on a dedicated writer thread
///
/// Failures of a background write are reported by the next `write`, `flush`
/// or `close` call as [`ContractError::DeferredWrite`]. A `write` returning
/// that error has still queued its own snapshot.
pub struct BackgroundSink<S: SnapshotSink + 'static> {
    name: String,
    target: Option<PathBuf>,
    sink: Option<S>,
    shared: Arc<Shared>,
    metrics: Arc<WriterMetrics>,
    worker: Option<JoinHandle<Result<(), ContractError>>>,
}

impl<S: SnapshotSink + 'static> BackgroundSink<S> {
    /// Wrap `sink`; the thread starts on `initialize` or the first write
    pub fn new(sink: S) -> Self {
        Self {
            name: sink.name().to_string(),
            target: sink.target().map(Path::to_path_buf),
            sink: Some(sink),
            shared: Arc::new(Shared::default()),
            metrics: Arc::new(WriterMetrics::new()),
            worker: None,
        }
    }

    pub fn metrics(&self) -> &Arc<WriterMetrics> {
        &self.metrics
    }

    fn ensure_started(&mut self) -> Result<(), PersistenceError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let Some(sink) = self.sink.take() else {
            return Err(PersistenceError::Worker {
                name: self.name.clone(),
                message: "writer already closed".to_string(),
            });
        };

        let shared = Arc::clone(&self.shared);
        let metrics = Arc::clone(&self.metrics);
        let worker = thread::Builder::new()
            .name(format!("snapshot-writer-{}", self.name))
            .spawn(move || writer_loop(sink, shared, metrics))
            .map_err(|e| PersistenceError::Worker {
                name: self.name.clone(),
                message: e.to_string(),
            })?;

        debug!(sink = %self.name, "Writer thread started");
        self.worker = Some(worker);
        Ok(())
    }

    fn take_error(&self) -> Result<(), ContractError> {
        match self.shared.slot.lock().last_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn wait_idle(&self) {
        let mut slot = self.shared.slot.lock();
        while slot.pending.is_some() || slot.busy {
            self.shared.idle.wait(&mut slot);
        }
    }

    fn shutdown(&mut self) -> Result<(), ContractError> {
        let Some(worker) = self.worker.take() else {
            self.sink = None;
            return Ok(());
        };

        {
            let mut slot = self.shared.slot.lock();
            slot.closed = true;
        }
        self.shared.ready.notify_all();

        let closed = worker.join().map_err(|_| PersistenceError::Worker {
            name: self.name.clone(),
            message: "writer thread panicked".to_string(),
        })?;

        debug!(sink = %self.name, "Writer thread stopped");
        self.take_error().and(closed)
    }
}

impl<S: SnapshotSink + 'static> SnapshotSink for BackgroundSink<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Runs on the caller's thread so the empty file exists before capture starts
    fn initialize(&mut self, empty: &CaptureSnapshot) -> Result<(), ContractError> {
        if let Some(sink) = self.sink.as_mut() {
            sink.initialize(empty)?;
        }
        self.ensure_started()?;
        Ok(())
    }

    fn write(&mut self, snapshot: &CaptureSnapshot) -> Result<(), ContractError> {
        self.ensure_started()?;
        let earlier = self.take_error();

        {
            let mut slot = self.shared.slot.lock();
            if slot.pending.replace(snapshot.clone()).is_some() {
                self.metrics.inc_replaced_count();
                debug!(sink = %self.name, "Pending snapshot replaced");
            }
            self.metrics.set_pending(true);
        }
        self.shared.ready.notify_one();

        earlier
    }

    #[instrument(name = "background_sink_flush", skip(self), fields(sink = %self.name))]
    fn flush(&mut self) -> Result<(), ContractError> {
        if self.worker.is_none() {
            return match self.sink.as_mut() {
                Some(sink) => sink.flush(),
                None => Ok(()),
            };
        }
        self.wait_idle();
        self.take_error()
    }

    #[instrument(name = "background_sink_close", skip(self), fields(sink = %self.name))]
    fn close(&mut self) -> Result<(), ContractError> {
        if self.worker.is_none() {
            if let Some(mut sink) = self.sink.take() {
                return sink.close();
            }
        }
        self.shutdown()
    }
}

impl<S: SnapshotSink + 'static> Drop for BackgroundSink<S> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.shutdown() {
                error!(sink = %self.name, error = %e, "Writer shutdown failed on drop");
            }
        }
    }
}

fn writer_loop<S: SnapshotSink>(
    mut sink: S,
    shared: Arc<Shared>,
    metrics: Arc<WriterMetrics>,
) -> Result<(), ContractError> {
    loop {
        let next = {
            let mut slot = shared.slot.lock();
            loop {
                if let Some(snapshot) = slot.pending.take() {
                    slot.busy = true;
                    metrics.set_pending(false);
                    break Some(snapshot);
                }
                if slot.closed {
                    break None;
                }
                shared.ready.wait(&mut slot);
            }
        };
        let Some(snapshot) = next else {
            break;
        };

        let result = sink.write(&snapshot);

        let mut slot = shared.slot.lock();
        slot.busy = false;
        match result {
            Ok(()) => metrics.inc_write_count(),
            Err(e) => {
                metrics.inc_failure_count();
                debug!(sink = %sink.name(), error = %e, "Background write failed");
                let failed = match slot.last_error.take() {
                    Some(ContractError::DeferredWrite { failed, .. }) => failed + 1,
                    _ => 1,
                };
                slot.last_error = Some(ContractError::DeferredWrite {
                    sink: sink.name().to_string(),
                    lap: snapshot.lap_meta.as_ref().map(|meta| meta.lap),
                    lap_complete: snapshot.metadata.lap_complete,
                    failed,
                    message: e.to_string(),
                });
            }
        }
        if slot.pending.is_none() {
            shared.idle.notify_all();
        }
    }

    shared.idle.notify_all();
    if let Err(e) = sink.flush() {
        warn!(sink = %sink.name(), error = %e, "Flush failed on shutdown");
    }
    sink.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::JsonFileSink;
    use contracts::{LapMeta, SessionMetadata};
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn snapshot(lap: u32) -> CaptureSnapshot {
        CaptureSnapshot {
            metadata: SessionMetadata::default(),
            lap_meta: Some(LapMeta {
                lap,
                lap_time: 60.0,
                distance: 900.0,
                sectors: Vec::new(),
            }),
            telemetry: Vec::new(),
        }
    }

    /// Records laps; each write blocks until the test releases it
    struct GatedSink {
        written: Arc<Mutex<Vec<u32>>>,
        gate: mpsc::Receiver<()>,
    }

    impl SnapshotSink for GatedSink {
        fn name(&self) -> &str {
            "gated"
        }

        fn initialize(&mut self, _empty: &CaptureSnapshot) -> Result<(), ContractError> {
            Ok(())
        }

        fn write(&mut self, snapshot: &CaptureSnapshot) -> Result<(), ContractError> {
            let _ = self.gate.recv();
            let lap = snapshot.lap_meta.as_ref().map(|m| m.lap).unwrap_or(0);
            self.written.lock().push(lap);
            Ok(())
        }
    }

    struct FailingSink;

    impl SnapshotSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        fn initialize(&mut self, _empty: &CaptureSnapshot) -> Result<(), ContractError> {
            Ok(())
        }

        fn write(&mut self, _snapshot: &CaptureSnapshot) -> Result<(), ContractError> {
            Err(ContractError::persistence("/readonly/telemetry.json", "disk full"))
        }
    }

    fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..500 {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_pending_snapshot_is_replaced() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let (release, gate) = mpsc::channel();
        let mut sink = BackgroundSink::new(GatedSink {
            written: Arc::clone(&written),
            gate,
        });

        sink.write(&snapshot(1)).unwrap();
        // lap 1 is now in flight, blocked on the gate
        wait_until(|| !sink.metrics().pending());

        sink.write(&snapshot(2)).unwrap();
        sink.write(&snapshot(3)).unwrap();
        assert_eq!(sink.metrics().replaced_count(), 1);

        release.send(()).unwrap();
        release.send(()).unwrap();
        sink.close().unwrap();

        assert_eq!(*written.lock(), vec![1, 3]);
        assert_eq!(sink.metrics().write_count(), 2);
    }

    #[test]
    fn test_failure_reported_on_flush() {
        let mut sink = BackgroundSink::new(FailingSink);

        sink.write(&snapshot(1)).unwrap();
        let err = sink.flush().unwrap_err();

        assert!(matches!(
            err,
            ContractError::DeferredWrite {
                lap: Some(1),
                failed: 1,
                ..
            }
        ));
        assert_eq!(sink.metrics().failure_count(), 1);
        assert!(sink.flush().is_ok());
    }

    /// Fails the first write only
    struct FlakySink {
        calls: u32,
        written: Arc<Mutex<Vec<u32>>>,
    }

    impl SnapshotSink for FlakySink {
        fn name(&self) -> &str {
            "flaky"
        }

        fn initialize(&mut self, _empty: &CaptureSnapshot) -> Result<(), ContractError> {
            Ok(())
        }

        fn write(&mut self, snapshot: &CaptureSnapshot) -> Result<(), ContractError> {
            self.calls += 1;
            if self.calls == 1 {
                return Err(ContractError::persistence("/tmp/telemetry.json", "disk full"));
            }
            let lap = snapshot.lap_meta.as_ref().map(|m| m.lap).unwrap_or(0);
            self.written.lock().push(lap);
            Ok(())
        }
    }

    #[test]
    fn test_earlier_failure_does_not_drop_current_write() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let mut sink = BackgroundSink::new(FlakySink {
            calls: 0,
            written: Arc::clone(&written),
        });

        sink.write(&snapshot(0)).unwrap();
        wait_until(|| sink.metrics().failure_count() == 1);

        // Reports lap 0's failure, queues lap 1 anyway
        let err = sink.write(&snapshot(1)).unwrap_err();
        assert!(matches!(
            err,
            ContractError::DeferredWrite {
                lap: Some(0),
                lap_complete: false,
                ..
            }
        ));

        sink.flush().unwrap();
        assert_eq!(*written.lock(), vec![1]);
        assert_eq!(sink.metrics().write_count(), 1);
    }

    #[test]
    fn test_close_drains_pending_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        let mut sink = BackgroundSink::new(JsonFileSink::new("json", &path));

        sink.initialize(&CaptureSnapshot::empty(SessionMetadata::default()))
            .unwrap();
        assert!(path.exists());
        assert_eq!(sink.target(), Some(path.as_path()));

        sink.write(&snapshot(5)).unwrap();
        sink.close().unwrap();

        let restored: CaptureSnapshot =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored.lap_meta.unwrap().lap, 5);
    }

    #[test]
    fn test_write_after_close_fails() {
        let mut sink = BackgroundSink::new(FailingSink);
        sink.close().unwrap();

        let err = sink.write(&snapshot(1)).unwrap_err();
        assert!(matches!(err, ContractError::Persistence { .. }));
    }
}
