//! Layered error definitions
//!
//! Categorized by source: config / sensor / metadata / persistence

use thiserror::Error;

use crate::Channel;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sensor Errors =====
    /// A scalar query failed or returned an out-of-range value
    #[error("sensor channel '{channel}' unavailable: {message}")]
    SensorUnavailable { channel: Channel, message: String },

    /// Optional enrichment field could not be read
    #[error("metadata field '{field}' unavailable")]
    MetadataUnavailable { field: String },

    // ===== Persistence Errors =====
    /// Durable write failed
    #[error("persistence to '{path}' failed: {message}")]
    Persistence { path: String, message: String },

    /// Background writes accepted by earlier calls have failed since
    ///
    /// `lap` and `lap_complete` describe the most recent failed snapshot.
    #[error("{failed} earlier write(s) to '{sink}' failed, last for lap {lap:?} (complete: {lap_complete}): {message}")]
    DeferredWrite {
        sink: String,
        lap: Option<u32>,
        lap_complete: bool,
        failed: u64,
        message: String,
    },

    // ===== General Errors =====
    /// Reading a config file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sensor unavailable error
    pub fn sensor_unavailable(channel: Channel, message: impl Into<String>) -> Self {
        Self::SensorUnavailable {
            channel,
            message: message.into(),
        }
    }

    /// Create metadata unavailable error
    pub fn metadata_unavailable(field: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            field: field.into(),
        }
    }

    /// Create persistence error
    pub fn persistence(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this reports earlier background writes rather than the current call
    pub fn is_deferred_write(&self) -> bool {
        matches!(self, Self::DeferredWrite { .. })
    }

    /// Whether the error belongs to the "skip this tick" class
    pub fn is_sensor_error(&self) -> bool {
        matches!(self, Self::SensorUnavailable { .. })
    }
}
