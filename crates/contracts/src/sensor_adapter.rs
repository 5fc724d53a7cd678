//! SensorAdapter trait - host live-state query abstraction
//!
//! Decouples the capture pipeline from the concrete host (simulator plugin
//! API, simulated vehicle, recorded replay).

use crate::{Channel, ContractError, VehicleId};

/// Pull-based sensor source
///
/// Every call returns the instantaneous reading at the time of the call; the
/// adapter keeps no capture state of its own.
///
/// # Example
///
/// ```ignore
/// let speed = adapter.scalar(PRIMARY_VEHICLE, Channel::Speed)?;
/// ```
pub trait SensorAdapter: Send {
    /// Read one scalar channel
    ///
    /// # Errors
    /// `SensorUnavailable` when the host cannot answer the query
    fn scalar(&self, vehicle: VehicleId, channel: Channel) -> Result<f64, ContractError>;

    /// Car model name of the vehicle
    fn car_name(&self, _vehicle: VehicleId) -> Result<String, ContractError> {
        Err(ContractError::metadata_unavailable("car_name"))
    }

    /// Track name of the running session
    fn track_name(&self) -> Result<String, ContractError> {
        Err(ContractError::metadata_unavailable("track_name"))
    }
}
