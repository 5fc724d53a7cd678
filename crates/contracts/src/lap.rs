//! LapMeta - summary of one completed lap

use serde::{Deserialize, Serialize};

/// Number of equal-distance sectors per lap
pub const SECTOR_COUNT: usize = 3;

/// Per-lap summary, created once when the lap finalizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapMeta {
    /// Host lap index of the lap
    pub lap: u32,

    /// Lap duration (session seconds)
    pub lap_time: f64,

    /// Total integrated distance (m)
    pub distance: f64,

    /// Exactly [`SECTOR_COUNT`] entries once finalized
    pub sectors: Vec<SectorStat>,
}

/// Average speed over one distance third of a lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorStat {
    /// 1-based sector number
    pub sector: u8,

    /// Lower distance bound (exclusive, except for sector 1)
    pub start: f64,

    /// Upper distance bound (inclusive)
    pub end: f64,

    /// Mean speed of samples inside the bounds, 0 when none
    pub avg_speed: f64,
}
