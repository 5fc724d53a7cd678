//! CaptureSnapshot - the unit of persistence

use serde::{Deserialize, Serialize};

use crate::{LapMeta, Sample};

/// Session-level enrichment written alongside every snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub car_name: String,

    pub track_name: String,

    /// `null` when the host cannot report a best lap
    pub best_lap_time_ms: Option<u64>,

    /// Samples contained in `telemetry`
    pub samples_logged: usize,

    /// Local time of the write request, `%Y-%m-%d %H:%M:%S`
    pub last_save_timestamp: String,

    /// False when the snapshot holds an unfinished lap
    pub lap_complete: bool,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            car_name: "unknown".to_string(),
            track_name: "unknown".to_string(),
            best_lap_time_ms: None,
            samples_logged: 0,
            last_save_timestamp: String::new(),
            lap_complete: false,
        }
    }
}

/// Complete content of the persisted file
///
/// Each write replaces the previous snapshot in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub metadata: SessionMetadata,

    /// `null` until a lap has completed
    pub lap_meta: Option<LapMeta>,

    pub telemetry: Vec<Sample>,
}

impl CaptureSnapshot {
    /// Empty structure written when a session starts and no file exists yet
    pub fn empty(metadata: SessionMetadata) -> Self {
        Self {
            metadata,
            lap_meta: None,
            telemetry: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_shape() {
        let snapshot = CaptureSnapshot::empty(SessionMetadata::default());
        let value = serde_json::to_value(&snapshot).unwrap();

        assert!(value["lapMeta"].is_null());
        assert_eq!(value["telemetry"].as_array().unwrap().len(), 0);
        assert!(value["metadata"]["bestLapTimeMs"].is_null());
        assert_eq!(value["metadata"]["carName"], "unknown");
    }
}
