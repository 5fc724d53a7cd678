//! Replay adapter - plays back recorded channel readings
//!
//! Reads a JSON-lines recording (one `{"t": <seconds>, <channels>...}` object
//! per line) and exposes the reading that was current at the replay clock.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use contracts::{Channel, ContractError, SensorAdapter, VehicleId};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::ChannelReadings;

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Playback speed multiplier (1.0 = original speed)
    pub speed_multiplier: f64,

    /// Restart from the first record when finished
    pub loop_playback: bool,

    pub car_name: Option<String>,

    pub track_name: Option<String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            loop_playback: false,
            car_name: None,
            track_name: None,
        }
    }
}

/// One line of the recording
#[derive(Debug, Clone, Deserialize)]
struct ReplayRecord {
    t: f64,
    #[serde(flatten)]
    readings: ChannelReadings,
}

#[derive(Debug)]
struct Cursor {
    clock: f64,
    index: usize,
    finished: bool,
}

/// Replay adapter
///
/// Clones share the playback cursor.
#[derive(Debug, Clone)]
pub struct ReplayAdapter {
    records: Arc<Vec<ReplayRecord>>,
    config: Arc<ReplayConfig>,
    cursor: Arc<Mutex<Cursor>>,
}

impl ReplayAdapter {
    /// Load a recording from a JSON-lines file
    pub fn load(path: &Path, config: ReplayConfig) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(&line).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("line {}: {e}", line_no + 1),
                )
            })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "recording contains no records",
            ));
        }

        records.sort_by(|a, b| a.t.total_cmp(&b.t));

        info!(
            path = %path.display(),
            records = records.len(),
            duration_secs = records[records.len() - 1].t - records[0].t,
            "Loaded replay recording"
        );

        Ok(Self {
            records: Arc::new(records),
            config: Arc::new(config),
            cursor: Arc::new(Mutex::new(Cursor {
                clock: 0.0,
                index: 0,
                finished: false,
            })),
        })
    }

    /// Whether a non-looping replay reached its last record
    pub fn is_finished(&self) -> bool {
        self.cursor.lock().finished
    }

    /// Recording length (seconds of recorded time)
    pub fn duration(&self) -> f64 {
        let first = self.records[0].t;
        self.records[self.records.len() - 1].t - first
    }

    /// Move the replay clock forward by `dt` host seconds
    pub fn advance(&self, dt: f64) {
        let mut cursor = self.cursor.lock();
        if cursor.finished {
            return;
        }

        cursor.clock += dt * self.config.speed_multiplier.max(0.0);
        let first = self.records[0].t;

        while cursor.index + 1 < self.records.len()
            && self.records[cursor.index + 1].t - first <= cursor.clock
        {
            cursor.index += 1;
        }

        if cursor.index + 1 == self.records.len() && cursor.clock >= self.duration() {
            if self.config.loop_playback {
                debug!("Looping replay");
                cursor.clock = 0.0;
                cursor.index = 0;
            } else {
                info!("Replay completed");
                cursor.finished = true;
            }
        }
    }

    fn current(&self) -> ChannelReadings {
        let index = self.cursor.lock().index;
        self.records[index].readings.clone()
    }
}

impl SensorAdapter for ReplayAdapter {
    fn scalar(&self, _vehicle: VehicleId, channel: Channel) -> Result<f64, ContractError> {
        self.current().get(channel)
    }

    fn car_name(&self, _vehicle: VehicleId) -> Result<String, ContractError> {
        self.config
            .car_name
            .clone()
            .ok_or_else(|| ContractError::metadata_unavailable("car_name"))
    }

    fn track_name(&self) -> Result<String, ContractError> {
        self.config
            .track_name
            .clone()
            .ok_or_else(|| ContractError::metadata_unavailable("track_name"))
    }
}
