//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the capture pipeline:
//! the persisted data model, the error taxonomy and the seam traits towards
//! the host simulation.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - The session clock is the sum of elapsed-time increments handed to the
//!   tick entry point (simulation seconds, f64)
//! - Lap times are differences of session clock readings

mod channel;
mod config;
mod error;
mod lap;
mod sample;
mod sensor_adapter;
mod sink;
mod snapshot;
mod status;

pub use channel::{Channel, VehicleId, PRIMARY_VEHICLE};
pub use config::*;
pub use error::*;
pub use lap::{LapMeta, SectorStat, SECTOR_COUNT};
pub use sample::{GearLabel, Sample};
pub use sensor_adapter::SensorAdapter;
pub use sink::SnapshotSink;
pub use snapshot::{CaptureSnapshot, SessionMetadata};
pub use status::StatusReporter;
