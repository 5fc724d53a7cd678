//! Configuration validation
//!
//! Rules:
//! - the interval rules of `CaptureConfig::check_intervals`
//! - persistence.file_name is a bare, non-empty `.json` file name
//! - persistence.output_dir is not empty

use contracts::{CaptureConfig, ContractError};

/// Validate a CaptureConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &CaptureConfig) -> Result<(), ContractError> {
    config.check_intervals()?;
    validate_output(config)?;
    Ok(())
}

fn validate_output(config: &CaptureConfig) -> Result<(), ContractError> {
    let persistence = &config.persistence;

    if persistence.output_dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "persistence.output_dir",
            "output_dir cannot be empty",
        ));
    }

    let name = persistence.file_name.as_str();
    if name.is_empty() {
        return Err(ContractError::config_validation(
            "persistence.file_name",
            "file_name cannot be empty",
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ContractError::config_validation(
            "persistence.file_name",
            format!("file_name must not contain path separators, got '{name}'"),
        ));
    }
    if !name.ends_with(".json") {
        return Err(ContractError::config_validation(
            "persistence.file_name",
            format!("file_name must end with .json, got '{name}'"),
        ));
    }
    Ok(())
}
