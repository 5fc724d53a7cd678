//! Lap segmenter - lap boundary detection and lap finalization

use contracts::{LapMeta, Sample};
use tracing::debug;

use crate::sampler::Reading;
use crate::sectors::compute_sectors;
use crate::TelemetryBuffer;

/// Outcome of feeding one reading to the segmenter
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Same lap; record this sample
    Append(Sample),

    /// Lap index changed
    ///
    /// `completed` is the finished lap, if one was active. The caller persists
    /// it and then calls [`LapSegmenter::begin_lap`]. Nothing is recorded on
    /// this tick.
    Transition {
        completed: Option<LapMeta>,
        next_lap: u32,
    },
}

/// Lap segmentation state
#[derive(Debug, Clone, Default)]
pub struct LapSegmenter {
    /// `None` until the first lap index is seen
    current_lap: Option<u32>,
    lap_active: bool,
    /// Session clock at the start of the active lap
    lap_start_time: f64,
    accumulated_distance: f64,
}

impl LapSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_lap(&self) -> Option<u32> {
        self.current_lap
    }

    pub fn lap_active(&self) -> bool {
        self.lap_active
    }

    pub fn lap_start_time(&self) -> f64 {
        self.lap_start_time
    }

    pub fn accumulated_distance(&self) -> f64 {
        self.accumulated_distance
    }

    /// Classify one sampling step
    ///
    /// Distance is integrated over `interval` seconds at the reading's speed,
    /// only when the reading is appended.
    pub fn step(
        &mut self,
        reading: &Reading,
        now: f64,
        interval: f64,
        buffer: &TelemetryBuffer,
    ) -> Step {
        if self.current_lap != Some(reading.lap) {
            let completed = self
                .lap_active
                .then(|| self.finalize(now, buffer));
            return Step::Transition {
                completed,
                next_lap: reading.lap,
            };
        }

        self.accumulated_distance += reading.speed / 3.6 * interval;

        Step::Append(Sample {
            distance: self.accumulated_distance,
            speed: reading.speed,
            gear: reading.gear,
            throttle: reading.throttle,
            brake: reading.brake,
        })
    }

    /// Summarize the active lap as of `now` without changing any state
    pub fn finalize(&self, now: f64, buffer: &TelemetryBuffer) -> LapMeta {
        let distance = self.accumulated_distance;
        LapMeta {
            lap: self.current_lap.unwrap_or_default(),
            lap_time: (now - self.lap_start_time).max(0.0),
            distance,
            sectors: compute_sectors(buffer.samples(), distance),
        }
    }

    /// Reset accumulation for `lap` starting at `now`
    pub fn begin_lap(&mut self, lap: u32, now: f64, buffer: &mut TelemetryBuffer) {
        debug!(
            previous = ?self.current_lap,
            lap,
            now,
            discarded = buffer.len(),
            "Lap boundary"
        );

        self.current_lap = Some(lap);
        self.lap_start_time = now;
        self.lap_active = true;
        self.accumulated_distance = 0.0;
        buffer.clear();
    }
}
