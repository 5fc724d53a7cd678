//! Snapshot of every channel a host exposes at one instant

use contracts::{Channel, ContractError};
use serde::{Deserialize, Serialize};

/// Channel values of the tracked vehicle
///
/// Optional channels are `None` when the host does not report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReadings {
    /// km/h
    pub speed: f64,
    /// Raw gear index
    pub gear: f64,
    pub throttle: f64,
    pub brake: f64,
    /// Completed laps counter
    pub lap: f64,
    #[serde(default)]
    pub position: f64,
    #[serde(default)]
    pub best_lap_ms: Option<f64>,
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub steer: Option<f64>,
    #[serde(default)]
    pub clutch: Option<f64>,
}

impl Default for ChannelReadings {
    fn default() -> Self {
        Self {
            speed: 0.0,
            gear: 1.0,
            throttle: 0.0,
            brake: 0.0,
            lap: 0.0,
            position: 0.0,
            best_lap_ms: None,
            rpm: None,
            steer: None,
            clutch: None,
        }
    }
}

impl ChannelReadings {
    /// Value of one channel
    pub fn get(&self, channel: Channel) -> Result<f64, ContractError> {
        let value = match channel {
            Channel::Speed => Some(self.speed),
            Channel::Gear => Some(self.gear),
            Channel::Throttle => Some(self.throttle),
            Channel::Brake => Some(self.brake),
            Channel::LapIndex => Some(self.lap),
            Channel::NormalizedPosition => Some(self.position),
            Channel::BestLapTime => self.best_lap_ms,
            Channel::Rpm => self.rpm,
            Channel::Steer => self.steer,
            Channel::Clutch => self.clutch,
        };
        value.ok_or_else(|| ContractError::sensor_unavailable(channel, "not reported by host"))
    }
}
