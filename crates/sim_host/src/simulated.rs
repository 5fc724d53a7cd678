//! Simulated vehicle
//!
//! Implements `SensorAdapter`, driving a single car around a closed loop with
//! a periodic speed profile. Used to run the capture pipeline without a host
//! simulator.

use std::f64::consts::TAU;
use std::sync::Arc;

use contracts::{Channel, ContractError, SensorAdapter, VehicleId};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::ChannelReadings;

/// Simulated vehicle configuration
#[derive(Debug, Clone)]
pub struct SimulatedVehicleConfig {
    /// Lap length (m)
    pub track_length_m: f64,
    /// Speed on the straights (km/h)
    pub top_speed_kmh: f64,
    /// Apex speed (km/h)
    pub corner_speed_kmh: f64,
    /// Braking zones per lap
    pub corners: u32,
    /// Forward gears
    pub gears: u32,
    pub car_name: String,
    pub track_name: String,
}

impl Default for SimulatedVehicleConfig {
    fn default() -> Self {
        Self {
            track_length_m: 2_500.0,
            top_speed_kmh: 210.0,
            corner_speed_kmh: 80.0,
            corners: 4,
            gears: 6,
            car_name: "sim_car".to_string(),
            track_name: "sim_ring".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct VehicleState {
    clock: f64,
    lap_distance: f64,
    lap: u32,
    lap_started_at: f64,
    best_lap_ms: Option<f64>,
    readings: ChannelReadings,
}

/// Simulated vehicle
///
/// Clones share the same vehicle: the host loop keeps one handle to
/// [`advance`](Self::advance) time while the capture session reads another.
#[derive(Debug, Clone)]
pub struct SimulatedVehicle {
    config: Arc<SimulatedVehicleConfig>,
    state: Arc<Mutex<VehicleState>>,
}

impl SimulatedVehicle {
    pub fn new(config: SimulatedVehicleConfig) -> Self {
        let vehicle = Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(VehicleState::default())),
        };
        vehicle.advance(0.0);
        vehicle
    }

    /// Create simulated vehicle with default configuration
    pub fn with_defaults() -> Self {
        Self::new(SimulatedVehicleConfig::default())
    }

    /// Completed laps so far
    pub fn lap(&self) -> u32 {
        self.state.lock().lap
    }

    /// Current readings
    pub fn readings(&self) -> ChannelReadings {
        self.state.lock().readings.clone()
    }

    /// Move the simulation forward by `dt` seconds
    pub fn advance(&self, dt: f64) {
        let config = &self.config;
        let mut state = self.state.lock();

        let position = state.lap_distance / config.track_length_m;
        let speed = speed_at(config, position);
        let previous_speed = state.readings.speed;

        state.clock += dt;
        state.lap_distance += speed / 3.6 * dt;

        if state.lap_distance >= config.track_length_m {
            state.lap_distance -= config.track_length_m;
            let lap_ms = (state.clock - state.lap_started_at) * 1000.0;
            state.best_lap_ms = Some(match state.best_lap_ms {
                Some(best) => best.min(lap_ms),
                None => lap_ms,
            });
            state.lap_started_at = state.clock;
            state.lap += 1;
            debug!(lap = state.lap, lap_ms, "simulated vehicle crossed the line");
        }

        let (throttle, brake) = pedals(previous_speed, speed, dt);
        state.readings = ChannelReadings {
            speed,
            gear: raw_gear(config, speed) as f64,
            throttle,
            brake,
            lap: state.lap as f64,
            position: state.lap_distance / config.track_length_m,
            best_lap_ms: state.best_lap_ms,
            rpm: Some(rpm(config, speed)),
            steer: Some(0.0),
            clutch: Some(0.0),
        };

        trace!(clock = state.clock, speed, lap = state.lap, "simulated vehicle advanced");
    }
}

impl SensorAdapter for SimulatedVehicle {
    fn scalar(&self, _vehicle: VehicleId, channel: Channel) -> Result<f64, ContractError> {
        self.state.lock().readings.get(channel)
    }

    fn car_name(&self, _vehicle: VehicleId) -> Result<String, ContractError> {
        Ok(self.config.car_name.clone())
    }

    fn track_name(&self) -> Result<String, ContractError> {
        Ok(self.config.track_name.clone())
    }
}

/// Periodic profile: top speed on straights, corner speed at each apex
fn speed_at(config: &SimulatedVehicleConfig, position: f64) -> f64 {
    let wave = 0.5 + 0.5 * (TAU * config.corners as f64 * position).cos();
    config.corner_speed_kmh + (config.top_speed_kmh - config.corner_speed_kmh) * wave
}

fn pedals(previous_speed: f64, speed: f64, dt: f64) -> (f64, f64) {
    if dt <= 0.0 {
        return (0.0, 0.0);
    }
    // km/h per second
    let accel = (speed - previous_speed) / dt;
    if accel >= 0.0 {
        ((0.4 + accel / 40.0).min(1.0), 0.0)
    } else {
        (0.0, (-accel / 60.0).min(1.0))
    }
}

/// Raw host gear index: 1 = neutral, n = gear n-1
fn raw_gear(config: &SimulatedVehicleConfig, speed: f64) -> u32 {
    if speed < 1.0 {
        return 1;
    }
    let band = config.top_speed_kmh / config.gears as f64;
    let gear = (speed / band).ceil() as u32;
    gear.clamp(1, config.gears) + 1
}

fn rpm(config: &SimulatedVehicleConfig, speed: f64) -> f64 {
    let band = config.top_speed_kmh / config.gears as f64;
    let within = (speed % band) / band;
    2_500.0 + within * 5_000.0
}
