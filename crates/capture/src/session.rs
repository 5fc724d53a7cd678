//! CaptureSession - owns the whole pipeline for one capture session
//!
//! The host calls [`CaptureSession::tick`] once per update with the elapsed
//! simulation time. Sampling, segmentation and inline writes all happen on
//! that call; nothing here is shared between threads.

use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::{
    CaptureConfig, CaptureSnapshot, Channel, ContractError, LapMeta, PersistencePolicy,
    SensorAdapter, SessionMetadata, ShutdownPolicy, SnapshotSink, StatusReporter, WriteMode,
    PRIMARY_VEHICLE,
};
use observability::{CaptureMetricsAggregator, MetricsSummary, WriteStatus};
use tracing::{debug, error, info, instrument, warn};

use crate::sampler::{Reading, Sampler};
use crate::segmenter::{LapSegmenter, Step};
use crate::{CaptureError, TelemetryBuffer};

const UNKNOWN: &str = "unknown";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One capture session
pub struct CaptureSession {
    config: CaptureConfig,
    adapter: Box<dyn SensorAdapter>,
    reporter: Box<dyn StatusReporter>,
    sink: Box<dyn SnapshotSink>,

    sampler: Sampler,
    segmenter: LapSegmenter,
    buffer: TelemetryBuffer,

    /// Sum of every `elapsed` passed to `tick`
    clock: f64,
    names: SessionNames,
    /// Most recent completed lap, carried into interval snapshots
    last_lap: Option<LapMeta>,
    next_interval_save: f64,
    stats: CaptureMetricsAggregator,
}

impl CaptureSession {
    /// Start a session writing through the sink described by `config`
    ///
    /// Reads car and track names, resolves the snapshot path and makes sure
    /// a snapshot file exists before the first tick.
    pub fn init(
        config: CaptureConfig,
        adapter: impl SensorAdapter + 'static,
        reporter: impl StatusReporter + 'static,
    ) -> Result<Self, ContractError> {
        let names = SessionNames::read(&adapter);
        let path = persistence::resolve_snapshot_path(
            &config.persistence,
            &names.car,
            &names.track,
            &Local::now(),
        );
        let sink = persistence::create_sink(&config.persistence, path);

        Self::start(config, Box::new(adapter), Box::new(reporter), sink, names)
    }

    /// Start a session writing through an explicit sink
    pub fn with_sink(
        config: CaptureConfig,
        adapter: impl SensorAdapter + 'static,
        reporter: impl StatusReporter + 'static,
        sink: Box<dyn SnapshotSink>,
    ) -> Result<Self, ContractError> {
        let names = SessionNames::read(&adapter);
        Self::start(config, Box::new(adapter), Box::new(reporter), sink, names)
    }

    #[instrument(name = "capture_session_init", skip_all, fields(sink = sink.name()))]
    fn start(
        config: CaptureConfig,
        adapter: Box<dyn SensorAdapter>,
        reporter: Box<dyn StatusReporter>,
        mut sink: Box<dyn SnapshotSink>,
        names: SessionNames,
    ) -> Result<Self, ContractError> {
        config.check_intervals()?;
        let interval = config.sampling.interval_secs;

        let empty = CaptureSnapshot::empty(session_metadata(adapter.as_ref(), &names, 0, false));
        sink.initialize(&empty)?;

        info!(
            car = %names.car,
            track = %names.track,
            interval_secs = interval,
            policy = ?config.persistence.policy,
            path = ?sink.target(),
            "Capture session started"
        );

        Ok(Self {
            sampler: Sampler::new(interval),
            segmenter: LapSegmenter::new(),
            buffer: TelemetryBuffer::new(),
            clock: 0.0,
            names,
            last_lap: None,
            next_interval_save: config.persistence.interval_secs,
            stats: CaptureMetricsAggregator::new(),
            adapter,
            reporter,
            sink,
            config,
        })
    }

    /// Advance the session by `elapsed` seconds of simulation time
    ///
    /// Never fails; problems are logged and counted.
    pub fn tick(&mut self, elapsed: f64) {
        if !(elapsed.is_finite() && elapsed >= 0.0) {
            warn!(elapsed, "Ignoring invalid tick increment");
            return;
        }
        self.clock += elapsed;

        if self.sampler.advance(elapsed) {
            self.sampling_step();
        }

        if self.config.persistence.policy == PersistencePolicy::Interval
            && self.clock >= self.next_interval_save
        {
            self.save_in_progress("interval");
            let period = self.config.persistence.interval_secs;
            while self.next_interval_save <= self.clock {
                self.next_interval_save += period;
            }
        }
    }

    fn sampling_step(&mut self) {
        let reading = match Reading::read(self.adapter.as_ref()) {
            Ok(reading) => reading,
            Err(e) => {
                self.report(e);
                return;
            }
        };

        self.reporter.set_text(&reading.status_line());

        let interval = self.sampler.interval();
        match self
            .segmenter
            .step(&reading, self.clock, interval, &self.buffer)
        {
            Step::Append(sample) => {
                self.buffer.push(sample);
                self.stats.record_sample();
                observability::record_sample(self.buffer.len());
            }
            Step::Transition {
                completed,
                next_lap,
            } => {
                if let Some(meta) = completed {
                    self.complete_lap(meta);
                }
                self.segmenter
                    .begin_lap(next_lap, self.clock, &mut self.buffer);
                info!(lap = next_lap, clock = self.clock, "Lap started");
            }
        }
    }

    fn complete_lap(&mut self, meta: LapMeta) {
        info!(
            lap = meta.lap,
            lap_time = meta.lap_time,
            distance = meta.distance,
            samples = self.buffer.len(),
            "Lap completed"
        );
        observability::record_lap_finalized(&meta);
        self.stats.record_lap(&meta);

        let snapshot = self.snapshot(Some(meta.clone()), true);
        self.persist(&snapshot, "lap");
        self.last_lap = Some(meta);
    }

    /// Write the last completed lap plus the lap in progress
    fn save_in_progress(&mut self, trigger: &'static str) {
        let snapshot = self.snapshot(self.last_lap.clone(), false);
        self.persist(&snapshot, trigger);
    }

    fn snapshot(&self, lap_meta: Option<LapMeta>, lap_complete: bool) -> CaptureSnapshot {
        CaptureSnapshot {
            metadata: self.metadata(self.buffer.len(), lap_complete),
            lap_meta,
            telemetry: self.buffer.to_vec(),
        }
    }

    fn metadata(&self, samples_logged: usize, lap_complete: bool) -> SessionMetadata {
        session_metadata(self.adapter.as_ref(), &self.names, samples_logged, lap_complete)
    }

    fn persist(&mut self, snapshot: &CaptureSnapshot, trigger: &'static str) {
        let accepted = match self.config.persistence.write_mode {
            WriteMode::Inline => WriteStatus::Success,
            WriteMode::Background => WriteStatus::Queued,
        };

        match self.sink.write(snapshot) {
            Ok(()) => {
                self.count_write(trigger, accepted);
                debug!(
                    trigger,
                    samples = snapshot.telemetry.len(),
                    "Snapshot persisted"
                );
            }
            // This snapshot was queued; the error belongs to an earlier one
            Err(e) if e.is_deferred_write() => {
                self.count_write(trigger, accepted);
                self.report(CaptureError::DeferredWrite(e));
            }
            Err(source) => {
                self.count_write(trigger, WriteStatus::Failure);
                self.report(CaptureError::Write { trigger, source });
            }
        }
    }

    fn count_write(&mut self, trigger: &'static str, status: WriteStatus) {
        observability::record_snapshot_write(self.sink.name(), trigger, status, 1);
        self.stats.record_write(status != WriteStatus::Failure);
    }

    /// Report background failures surfaced by `flush`/`close`, pass the rest on
    fn absorb_deferred(&mut self, result: Result<(), ContractError>) -> Result<(), ContractError> {
        match result {
            Err(e) if e.is_deferred_write() => {
                self.report(CaptureError::DeferredWrite(e));
                Ok(())
            }
            other => other,
        }
    }

    /// Single sink for every in-tick failure
    fn report(&mut self, err: CaptureError) {
        if let Some(reason) = err.skip_reason() {
            self.stats.record_skip();
            observability::record_tick_skipped(reason);
            debug!(clock = self.clock, error = %err, "Sampling step skipped");
            return;
        }

        if let CaptureError::DeferredWrite(_) = err {
            let failed = err.failed_writes();
            self.stats.record_deferred_failures(failed);
            observability::record_snapshot_write(
                self.sink.name(),
                err.failed_trigger(),
                WriteStatus::Failure,
                failed,
            );
        }
        error!(
            clock = self.clock,
            trigger = err.failed_trigger(),
            path = ?self.snapshot_path(),
            error = %err,
            "Snapshot write failed, previous snapshot kept"
        );
    }

    /// Apply the shutdown policy, drain the sink and return the run summary
    #[instrument(name = "capture_session_shutdown", skip(self), fields(clock = self.clock))]
    pub fn shutdown(mut self) -> Result<MetricsSummary, ContractError> {
        match self.config.persistence.on_shutdown {
            ShutdownPolicy::Flush if self.segmenter.lap_active() && !self.buffer.is_empty() => {
                let partial = self.segmenter.finalize(self.clock, &self.buffer);
                info!(
                    lap = partial.lap,
                    samples = self.buffer.len(),
                    "Writing partial lap"
                );
                let snapshot = self.snapshot(Some(partial), false);
                self.persist(&snapshot, "shutdown");
            }
            ShutdownPolicy::Flush => debug!("No lap in progress"),
            ShutdownPolicy::Discard => {
                debug!(discarded = self.buffer.len(), "Discarding lap in progress");
            }
        }

        let flushed = self.sink.flush();
        let flushed = self.absorb_deferred(flushed);
        let closed = self.sink.close();
        let closed = self.absorb_deferred(closed);
        let summary = self.stats.summary();
        info!(
            samples = summary.total_samples,
            laps = summary.laps_finalized,
            writes = summary.snapshot_writes,
            failures = summary.write_failures,
            "Capture session stopped"
        );

        flushed.and(closed).map(|()| summary)
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn buffer(&self) -> &TelemetryBuffer {
        &self.buffer
    }

    pub fn current_lap(&self) -> Option<u32> {
        self.segmenter.current_lap()
    }

    pub fn last_completed_lap(&self) -> Option<&LapMeta> {
        self.last_lap.as_ref()
    }

    pub fn car_name(&self) -> &str {
        &self.names.car
    }

    pub fn track_name(&self) -> &str {
        &self.names.track
    }

    /// File the sink writes to, if any
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.sink.target().map(Path::to_path_buf)
    }

    pub fn stats(&self) -> &CaptureMetricsAggregator {
        &self.stats
    }
}

#[derive(Debug, Clone)]
struct SessionNames {
    car: String,
    track: String,
}

impl SessionNames {
    fn read(adapter: &dyn SensorAdapter) -> Self {
        Self {
            car: metadata_or_unknown(adapter.car_name(PRIMARY_VEHICLE)),
            track: metadata_or_unknown(adapter.track_name()),
        }
    }
}

fn metadata_or_unknown(value: Result<String, ContractError>) -> String {
    match value {
        Ok(name) if !name.trim().is_empty() => name,
        Ok(_) => UNKNOWN.to_string(),
        Err(e) => {
            debug!(error = %e, "Session metadata unavailable");
            UNKNOWN.to_string()
        }
    }
}

fn session_metadata(
    adapter: &dyn SensorAdapter,
    names: &SessionNames,
    samples_logged: usize,
    lap_complete: bool,
) -> SessionMetadata {
    SessionMetadata {
        car_name: names.car.clone(),
        track_name: names.track.clone(),
        best_lap_time_ms: best_lap_time_ms(adapter),
        samples_logged,
        last_save_timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        lap_complete,
    }
}

/// Best lap in milliseconds; `None` when unset or unavailable
fn best_lap_time_ms(adapter: &dyn SensorAdapter) -> Option<u64> {
    match adapter.scalar(PRIMARY_VEHICLE, Channel::BestLapTime) {
        Ok(ms) if ms.is_finite() && ms > 0.0 => Some(ms.round() as u64),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Best lap time unavailable");
            None
        }
    }
}
