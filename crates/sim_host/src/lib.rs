//! # Sim Host
//!
//! Host-side collaborators of the capture pipeline.
//!
//! Responsibilities:
//! - Provide `SensorAdapter` implementations without a running simulator
//! - Simulated vehicle, scripted readings and recorded replay
//! - Status reporters standing in for the on-screen label

pub mod readings;
pub mod replay;
pub mod scripted;
pub mod simulated;
pub mod status;

pub use contracts::{SensorAdapter, StatusReporter};
pub use readings::ChannelReadings;
pub use replay::{ReplayAdapter, ReplayConfig};
pub use scripted::ScriptedAdapter;
pub use simulated::{SimulatedVehicle, SimulatedVehicleConfig};
pub use status::{LogStatusReporter, RecordingStatusReporter};
