//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{CaptureConfig, NamingPolicy, PersistencePolicy, ShutdownPolicy, SinkKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    sampling_interval_secs: f64,
    sink: SinkKind,
    output_dir: String,
    naming: NamingPolicy,
    policy: PersistencePolicy,
    write_mode: contracts::WriteMode,
    on_shutdown: ShutdownPolicy,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            let persistence = &config.persistence;

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    sampling_interval_secs: config.sampling.interval_secs,
                    sink: persistence.sink,
                    output_dir: persistence.output_dir.display().to_string(),
                    naming: persistence.naming,
                    policy: persistence.policy,
                    write_mode: persistence.write_mode,
                    on_shutdown: persistence.on_shutdown,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &CaptureConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let persistence = &config.persistence;

    if persistence.sink == SinkKind::Log {
        warnings.push("persistence.sink is 'log' - snapshots will not be written to disk".to_string());
    }

    if config.sampling.interval_secs > 1.0 {
        warnings.push(format!(
            "sampling.interval_secs = {} - sector averages will be coarse",
            config.sampling.interval_secs
        ));
    }

    if persistence.policy == PersistencePolicy::Interval
        && persistence.interval_secs < config.sampling.interval_secs
    {
        warnings.push(
            "persistence.interval_secs is shorter than the sampling interval - some saves will repeat the previous snapshot"
                .to_string(),
        );
    }

    if persistence.on_shutdown == ShutdownPolicy::Flush && persistence.naming == NamingPolicy::Fixed
    {
        warnings.push(
            "on_shutdown = 'flush' with a fixed file name replaces the last complete lap with a partial one"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Sampling interval: {}s", summary.sampling_interval_secs);
            println!("  Sink: {:?}", summary.sink);
            println!("  Output dir: {}", summary.output_dir);
            println!("  Naming: {:?}", summary.naming);
            println!("  Policy: {:?}", summary.policy);
            println!("  Write mode: {:?}", summary.write_mode);
            println!("  On shutdown: {:?}", summary.on_shutdown);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(path: &Path) -> ValidateArgs {
        ValidateArgs {
            config: path.to_path_buf(),
            json: true,
        }
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltasync.toml");
        std::fs::write(
            &path,
            "[persistence]\nsink = \"log\"\nnaming = \"fixed\"\non_shutdown = \"flush\"\n",
        )
        .unwrap();

        let result = validate_config(&args(&path));

        assert!(result.valid);
        assert_eq!(result.warnings.as_ref().map(Vec::len), Some(2));
        assert_eq!(result.summary.as_ref().unwrap().sink, SinkKind::Log);
    }

    #[test]
    fn test_invalid_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deltasync.toml");
        std::fs::write(&path, "[sampling]\ninterval_secs = -0.5\n").unwrap();

        let result = validate_config(&args(&path));

        assert!(!result.valid);
        assert!(result.error.unwrap().contains("interval_secs"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(&args(Path::new("/nonexistent/deltasync.toml")));
        assert!(!result.valid);
        assert!(result.summary.is_none());
    }
}
