//! Host loop - plays the role of the simulator driving a capture session.
//!
//! Each step advances the vehicle source by one tick and then hands the same
//! elapsed time to the session, the way a host calls its plugin update.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use capture::CaptureSession;
use contracts::{CaptureConfig, Channel, ContractError, SensorAdapter, VehicleId};
use sim_host::{LogStatusReporter, ReplayAdapter, SimulatedVehicle};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::RunStats;

/// Shortest wall-clock period between two ticks
pub const MIN_TICK_PERIOD: Duration = Duration::from_micros(1);

/// Wall-clock period of one tick of `tick` simulated seconds at `speedup`
///
/// `None` when the ratio does not fit a `Duration` or is below
/// [`MIN_TICK_PERIOD`].
pub fn tick_period(tick: f64, speedup: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(tick / speedup)
        .ok()
        .filter(|period| *period >= MIN_TICK_PERIOD)
}

/// Where vehicle readings come from
#[derive(Debug, Clone)]
pub enum HostSource {
    Simulated(SimulatedVehicle),
    Replay(ReplayAdapter),
}

impl HostSource {
    fn advance(&self, dt: f64) {
        match self {
            Self::Simulated(vehicle) => vehicle.advance(dt),
            Self::Replay(replay) => replay.advance(dt),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Self::Simulated(_) => false,
            Self::Replay(replay) => replay.is_finished(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Simulated(_) => "simulated",
            Self::Replay(_) => "replay",
        }
    }
}

impl SensorAdapter for HostSource {
    fn scalar(&self, vehicle: VehicleId, channel: Channel) -> Result<f64, ContractError> {
        match self {
            Self::Simulated(v) => v.scalar(vehicle, channel),
            Self::Replay(r) => r.scalar(vehicle, channel),
        }
    }

    fn car_name(&self, vehicle: VehicleId) -> Result<String, ContractError> {
        match self {
            Self::Simulated(v) => v.car_name(vehicle),
            Self::Replay(r) => r.car_name(vehicle),
        }
    }

    fn track_name(&self) -> Result<String, ContractError> {
        match self {
            Self::Simulated(v) => v.track_name(),
            Self::Replay(r) => r.track_name(),
        }
    }
}

/// Host loop configuration
#[derive(Debug, Clone)]
pub struct HostLoopConfig {
    pub capture: CaptureConfig,

    pub source: HostSource,

    /// Simulation seconds per host update
    pub tick: f64,

    /// Simulation seconds to run (None = until stopped)
    pub duration: Option<f64>,

    /// Simulation seconds per wall-clock second
    pub speedup: f64,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Drives one capture session until the duration, the replay or a signal ends it
pub struct HostLoop {
    config: HostLoopConfig,
}

impl HostLoop {
    pub fn new(config: HostLoopConfig) -> Self {
        Self { config }
    }

    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RunStats> {
        let config = self.config;
        let period = tick_period(config.tick, config.speedup).with_context(|| {
            format!(
                "tick {} at speedup {} gives no usable wall-clock period",
                config.tick, config.speedup
            )
        })?;

        if let Some(port) = config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let mut session = CaptureSession::init(
            config.capture.clone(),
            config.source.clone(),
            LogStatusReporter::new("status"),
        )
        .context("Failed to start capture session")?;
        let snapshot_path: Option<PathBuf> = session.snapshot_path();

        info!(
            source = config.source.kind(),
            tick = config.tick,
            duration = ?config.duration,
            speedup = config.speedup,
            "Host loop started"
        );

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let started = Instant::now();
        let mut ticks: u64 = 0;
        let mut interrupted = false;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    config.source.advance(config.tick);
                    session.tick(config.tick);
                    ticks += 1;

                    if config.duration.is_some_and(|d| session.clock() >= d) {
                        info!(clock = session.clock(), "Duration reached");
                        break;
                    }
                    if config.source.is_finished() {
                        info!(clock = session.clock(), "Replay finished");
                        break;
                    }
                }
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping capture...");
                    interrupted = true;
                    break;
                }
            }
        }

        let sim_seconds = session.clock();
        let summary = session
            .shutdown()
            .context("Capture session did not shut down cleanly")?;

        Ok(RunStats {
            ticks,
            sim_seconds,
            wall_time: started.elapsed(),
            interrupted,
            snapshot_path,
            summary,
        })
    }
}
