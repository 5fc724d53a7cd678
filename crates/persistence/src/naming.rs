//! Snapshot file naming

use std::path::PathBuf;

use chrono::{DateTime, TimeZone};
use contracts::{NamingPolicy, PersistenceConfig};

/// Placeholder for names that sanitize to nothing
pub const UNKNOWN_NAME: &str = "unknown";

/// Keep `[A-Za-z0-9_-]`, replace everything else with `_`
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        cleaned
    }
}

/// `telemetry_<track>_<car>_<YYYYmmdd_HHMMSS>.json`
pub fn session_file_name<Tz>(car: &str, track: &str, started: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "telemetry_{}_{}_{}.json",
        sanitize(track),
        sanitize(car),
        started.format("%Y%m%d_%H%M%S")
    )
}

/// Full path of the snapshot file for one session
pub fn resolve_snapshot_path<Tz>(
    config: &PersistenceConfig,
    car: &str,
    track: &str,
    started: &DateTime<Tz>,
) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let file_name = match config.naming {
        NamingPolicy::Session => session_file_name(car, track, started),
        NamingPolicy::Fixed => config.file_name.clone(),
    };
    config.output_dir.join(file_name)
}
