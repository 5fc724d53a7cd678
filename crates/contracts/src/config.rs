//! CaptureConfig - Config Loader output
//!
//! Describes one capture session: sampling cadence and the persistence
//! policy (where, when and how snapshots are written).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ContractError;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete capture configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Persistence settings
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl CaptureConfig {
    /// Check the timing rules every session relies on
    ///
    /// - sampling.interval_secs is finite and > 0
    /// - persistence.interval_secs is finite and > 0 for the interval policy
    pub fn check_intervals(&self) -> Result<(), ContractError> {
        let interval = self.sampling.interval_secs;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ContractError::config_validation(
                "sampling.interval_secs",
                format!("interval_secs must be > 0, got {interval}"),
            ));
        }

        let persistence = &self.persistence;
        if persistence.policy == PersistencePolicy::Interval {
            let interval = persistence.interval_secs;
            if !interval.is_finite() || interval <= 0.0 {
                return Err(ContractError::config_validation(
                    "persistence.interval_secs",
                    format!("interval_secs must be > 0 for the interval policy, got {interval}"),
                ));
            }
        }
        Ok(())
    }
}

/// Sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Minimum time between two samples (seconds), must be > 0
    #[serde(default = "default_sample_interval")]
    pub interval_secs: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sample_interval(),
        }
    }
}

fn default_sample_interval() -> f64 {
    0.25
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Output backend
    #[serde(default)]
    pub sink: SinkKind,

    /// Directory holding the snapshot file
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File naming policy
    #[serde(default)]
    pub naming: NamingPolicy,

    /// File name used by [`NamingPolicy::Fixed`]
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Write cadence
    #[serde(default)]
    pub policy: PersistencePolicy,

    /// Period of [`PersistencePolicy::Interval`] writes (session seconds)
    #[serde(default = "default_save_interval")]
    pub interval_secs: f64,

    /// Where the write runs
    #[serde(default)]
    pub write_mode: WriteMode,

    /// Fate of the in-progress lap at shutdown
    #[serde(default)]
    pub on_shutdown: ShutdownPolicy,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            output_dir: default_output_dir(),
            naming: NamingPolicy::default(),
            file_name: default_file_name(),
            policy: PersistencePolicy::default(),
            interval_secs: default_save_interval(),
            write_mode: WriteMode::default(),
            on_shutdown: ShutdownPolicy::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./telemetry")
}

fn default_file_name() -> String {
    "telemetry.json".to_string()
}

fn default_save_interval() -> f64 {
    10.0
}

/// Snapshot output backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Atomic JSON file
    #[default]
    JsonFile,
    /// Tracing event only
    Log,
}

/// Snapshot file naming
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// `telemetry_<track>_<car>_<YYYYmmdd_HHMMSS>.json`
    #[default]
    Session,
    /// `file_name` as configured
    Fixed,
}

/// When snapshots are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Once per completed lap
    #[default]
    PerLap,
    /// Per completed lap and every `interval_secs` of session time
    Interval,
}

/// Where the durable write executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Synchronously on the tick path
    #[default]
    Inline,
    /// On a writer thread fed through a single slot
    Background,
}

/// Handling of the in-progress lap at shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPolicy {
    /// Drop the unfinished lap, the file keeps the last complete lap
    #[default]
    Discard,
    /// Finalize the unfinished lap as partial and write it once more
    Flush,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.sampling.interval_secs, 0.25);
        assert_eq!(config.persistence.policy, PersistencePolicy::PerLap);
        assert_eq!(config.persistence.write_mode, WriteMode::Inline);
        assert_eq!(config.persistence.on_shutdown, ShutdownPolicy::Discard);
        assert_eq!(config.persistence.naming, NamingPolicy::Session);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CaptureConfig =
            serde_json::from_str(r#"{ "persistence": { "policy": "interval" } }"#).unwrap();
        assert_eq!(config.persistence.policy, PersistencePolicy::Interval);
        assert_eq!(config.persistence.interval_secs, 10.0);
        assert_eq!(config.sampling.interval_secs, 0.25);
    }

    #[test]
    fn test_check_intervals() {
        let mut config = CaptureConfig::default();
        assert!(config.check_intervals().is_ok());

        config.persistence.interval_secs = f64::INFINITY;
        assert!(config.check_intervals().is_ok());
        config.persistence.policy = PersistencePolicy::Interval;
        assert!(matches!(
            config.check_intervals(),
            Err(ContractError::ConfigValidation { ref field, .. }) if field == "persistence.interval_secs"
        ));

        config.persistence.interval_secs = 5.0;
        config.sampling.interval_secs = -0.25;
        assert!(matches!(
            config.check_intervals(),
            Err(ContractError::ConfigValidation { ref field, .. }) if field == "sampling.interval_secs"
        ));
    }
}
