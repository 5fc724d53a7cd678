//! Capture error types

use contracts::{Channel, ContractError};
use thiserror::Error;

/// Failures inside one tick; none of them stops the session
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("sensor read failed: {0}")]
    Sensor(#[source] ContractError),

    #[error("{channel} reading {value} out of range")]
    OutOfRange { channel: Channel, value: f64 },

    #[error("{trigger} snapshot write failed: {source}")]
    Write {
        trigger: &'static str,
        #[source]
        source: ContractError,
    },

    /// A background write queued by an earlier trigger has failed
    #[error("background snapshot write failed: {0}")]
    DeferredWrite(#[source] ContractError),
}

impl CaptureError {
    /// Metrics label of a skipped sampling step, `None` for write failures
    pub fn skip_reason(&self) -> Option<&'static str> {
        match self {
            Self::Sensor(_) => Some("sensor"),
            Self::OutOfRange { .. } => Some("out_of_range"),
            Self::Write { .. } | Self::DeferredWrite(_) => None,
        }
    }

    /// Trigger label of the snapshot that actually failed
    ///
    /// A background failure only knows its snapshot: a complete lap was a
    /// `lap` write, anything else an `in_progress` one.
    pub fn failed_trigger(&self) -> &'static str {
        match self {
            Self::Write { trigger, .. } => *trigger,
            Self::DeferredWrite(ContractError::DeferredWrite {
                lap_complete: true, ..
            }) => "lap",
            _ => "in_progress",
        }
    }

    /// Number of writes this error accounts for
    pub fn failed_writes(&self) -> u64 {
        match self {
            Self::Write { .. } => 1,
            Self::DeferredWrite(ContractError::DeferredWrite { failed, .. }) => *failed,
            Self::DeferredWrite(_) => 1,
            _ => 0,
        }
    }
}
