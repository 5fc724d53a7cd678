//! Scalar channels exposed by the host's live-state query surface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host vehicle handle
pub type VehicleId = u32;

/// The local player's vehicle; the only one ever captured
pub const PRIMARY_VEHICLE: VehicleId = 0;

/// Scalar channel of the sensor adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Speed in km/h
    Speed,
    /// Raw gear index (0 = reverse, 1 = neutral, n = gear n-1)
    Gear,
    /// Throttle pedal, 0..1
    Throttle,
    /// Brake pedal, 0..1
    Brake,
    /// Completed laps counter
    LapIndex,
    /// Position along the lap, 0..1
    NormalizedPosition,
    /// Best lap time in milliseconds
    BestLapTime,
    Rpm,
    Steer,
    Clutch,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Gear => "gear",
            Self::Throttle => "throttle",
            Self::Brake => "brake",
            Self::LapIndex => "lap_index",
            Self::NormalizedPosition => "normalized_position",
            Self::BestLapTime => "best_lap_time",
            Self::Rpm => "rpm",
            Self::Steer => "steer",
            Self::Clutch => "clutch",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
