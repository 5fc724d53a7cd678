//! Sample - one telemetry record of the lap in progress

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display label of the gearbox state
///
/// Persisted as a JSON string: `"R"`, `"N"` or the forward gear number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GearLabel {
    Reverse,
    Neutral,
    Forward(u32),
}

impl GearLabel {
    /// Map the host's raw gear index: `0 → R`, `1 → N`, `n → n-1`
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Reverse,
            1 => Self::Neutral,
            n => Self::Forward(n - 1),
        }
    }
}

impl fmt::Display for GearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reverse => f.write_str("R"),
            Self::Neutral => f.write_str("N"),
            Self::Forward(n) => write!(f, "{n}"),
        }
    }
}

impl From<GearLabel> for String {
    fn from(label: GearLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for GearLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "R" => Ok(Self::Reverse),
            "N" => Ok(Self::Neutral),
            other => match other.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Self::Forward(n)),
                _ => Err(format!("invalid gear label '{other}'")),
            },
        }
    }
}

/// Telemetry sample
///
/// Immutable once created. `distance` is metres travelled since the start of
/// the lap it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Integrated lap distance (m)
    pub distance: f64,

    /// Speed (km/h)
    pub speed: f64,

    /// Gear label
    pub gear: GearLabel,

    /// Throttle, 0..1
    pub throttle: f64,

    /// Brake, 0..1
    pub brake: f64,
}
