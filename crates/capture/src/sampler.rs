//! Sampler - time accumulation and channel reads
//!
//! The host decides the tick cadence; the sampler only decides whether the
//! current tick is a sampling step.

use contracts::{Channel, GearLabel, SensorAdapter, PRIMARY_VEHICLE};

use crate::CaptureError;

/// Fixed-interval time accumulator
#[derive(Debug, Clone)]
pub struct Sampler {
    interval: f64,
    accumulator: f64,
}

impl Sampler {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            accumulator: 0.0,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Add `elapsed` seconds; true when a sampling step is due
    ///
    /// The accumulator resets to zero on a due step, the surplus is dropped.
    pub fn advance(&mut self, elapsed: f64) -> bool {
        self.accumulator += elapsed;
        if self.accumulator >= self.interval {
            self.accumulator = 0.0;
            true
        } else {
            false
        }
    }
}

/// Validated readings of one sampling step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// km/h
    pub speed: f64,
    pub gear: GearLabel,
    pub throttle: f64,
    pub brake: f64,
    pub lap: u32,
}

impl Reading {
    /// Query every channel, then validate
    ///
    /// Nothing is returned unless all channels answered with in-range values.
    pub fn read(adapter: &dyn SensorAdapter) -> Result<Self, CaptureError> {
        let query = |channel| {
            adapter
                .scalar(PRIMARY_VEHICLE, channel)
                .map_err(CaptureError::Sensor)
        };

        let speed = query(Channel::Speed)?;
        let gear = query(Channel::Gear)?;
        let throttle = query(Channel::Throttle)?;
        let brake = query(Channel::Brake)?;
        let lap = query(Channel::LapIndex)?;

        Ok(Self {
            speed: non_negative(Channel::Speed, speed)?,
            gear: GearLabel::from_raw(index(Channel::Gear, gear)?),
            throttle: unit(Channel::Throttle, throttle)?,
            brake: unit(Channel::Brake, brake)?,
            lap: index(Channel::LapIndex, lap)?,
        })
    }

    /// One-line summary for the status display
    pub fn status_line(&self) -> String {
        format!(
            "Spd:{:.0} | G:{} | Th:{:.0}% | Br:{:.0}%",
            self.speed,
            self.gear,
            self.throttle * 100.0,
            self.brake * 100.0
        )
    }
}

fn non_negative(channel: Channel, value: f64) -> Result<f64, CaptureError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CaptureError::OutOfRange { channel, value })
    }
}

fn unit(channel: Channel, value: f64) -> Result<f64, CaptureError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CaptureError::OutOfRange { channel, value })
    }
}

fn index(channel: Channel, value: f64) -> Result<u32, CaptureError> {
    let rounded = non_negative(channel, value)?.round();
    if rounded > f64::from(u32::MAX) {
        return Err(CaptureError::OutOfRange { channel, value });
    }
    Ok(rounded as u32)
}
