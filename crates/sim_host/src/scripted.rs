//! Scripted adapter
//!
//! Returns whatever readings the test or host harness last set, with
//! optional failure injection per channel.

use std::collections::HashSet;
use std::sync::Arc;

use contracts::{Channel, ContractError, SensorAdapter, VehicleId};
use parking_lot::Mutex;

use crate::ChannelReadings;

#[derive(Debug, Default)]
struct ScriptState {
    readings: ChannelReadings,
    failing: HashSet<Channel>,
    car: Option<String>,
    track: Option<String>,
}

/// Adapter whose readings are set from outside
///
/// Clones share the same state, so a harness can keep one handle while the
/// capture session owns the other.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAdapter {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedAdapter {
    pub fn new(readings: ChannelReadings) -> Self {
        let adapter = Self::default();
        adapter.set(readings);
        adapter
    }

    /// Attach car and track names
    pub fn with_names(self, car: impl Into<String>, track: impl Into<String>) -> Self {
        {
            let mut state = self.state.lock();
            state.car = Some(car.into());
            state.track = Some(track.into());
        }
        self
    }

    /// Replace all readings
    pub fn set(&self, readings: ChannelReadings) {
        self.state.lock().readings = readings;
    }

    /// Modify readings in place
    pub fn update(&self, f: impl FnOnce(&mut ChannelReadings)) {
        f(&mut self.state.lock().readings);
    }

    /// Current readings
    pub fn readings(&self) -> ChannelReadings {
        self.state.lock().readings.clone()
    }

    /// Make queries of `channel` fail until [`Self::recover`]
    pub fn fail(&self, channel: Channel) {
        self.state.lock().failing.insert(channel);
    }

    /// Clear all injected failures
    pub fn recover(&self) {
        self.state.lock().failing.clear();
    }
}

impl SensorAdapter for ScriptedAdapter {
    fn scalar(&self, _vehicle: VehicleId, channel: Channel) -> Result<f64, ContractError> {
        let state = self.state.lock();
        if state.failing.contains(&channel) {
            return Err(ContractError::sensor_unavailable(channel, "injected failure"));
        }
        state.readings.get(channel)
    }

    fn car_name(&self, _vehicle: VehicleId) -> Result<String, ContractError> {
        self.state
            .lock()
            .car
            .clone()
            .ok_or_else(|| ContractError::metadata_unavailable("car_name"))
    }

    fn track_name(&self) -> Result<String, ContractError> {
        self.state
            .lock()
            .track
            .clone()
            .ok_or_else(|| ContractError::metadata_unavailable("track_name"))
    }
}
