//! `inspect` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{CaptureSnapshot, Sample, SectorStat};
use serde::Serialize;
use tracing::info;

use crate::cli::InspectArgs;
use crate::error::CliError;

/// Snapshot report for JSON output
#[derive(Debug, Serialize)]
struct SnapshotReport {
    car_name: String,
    track_name: String,
    lap_complete: bool,
    last_save_timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    best_lap_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lap: Option<LapReport>,
    telemetry: TelemetryReport,
}

#[derive(Debug, Serialize)]
struct LapReport {
    lap: u32,
    lap_time: f64,
    distance: f64,
    sectors: Vec<SectorStat>,
}

#[derive(Debug, Default, Serialize)]
struct TelemetryReport {
    samples: usize,
    /// Declared by the writer; differs from `samples` only in a damaged file
    samples_logged: usize,
    first_distance: Option<f64>,
    last_distance: Option<f64>,
    max_speed: Option<f64>,
    avg_throttle: Option<f64>,
    avg_brake: Option<f64>,
}

/// Execute the `inspect` command
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    info!(file = %args.file.display(), "Inspecting snapshot");

    let snapshot = read_snapshot(&args.file)?;
    let report = build_report(&snapshot);

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize snapshot report")?;
        println!("{}", json);
        if args.samples {
            let json = serde_json::to_string_pretty(&snapshot.telemetry)
                .context("Failed to serialize samples")?;
            println!("{}", json);
        }
    } else {
        print_report(&report);
        if args.samples {
            print_samples(&snapshot.telemetry);
        }
    }

    Ok(())
}

fn read_snapshot(path: &Path) -> Result<CaptureSnapshot, CliError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| CliError::snapshot_read(path, e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| CliError::snapshot_read(path, e.to_string()))
}

fn build_report(snapshot: &CaptureSnapshot) -> SnapshotReport {
    let metadata = &snapshot.metadata;

    SnapshotReport {
        car_name: metadata.car_name.clone(),
        track_name: metadata.track_name.clone(),
        lap_complete: metadata.lap_complete,
        last_save_timestamp: metadata.last_save_timestamp.clone(),
        best_lap_time_ms: metadata.best_lap_time_ms,
        lap: snapshot.lap_meta.as_ref().map(|meta| LapReport {
            lap: meta.lap,
            lap_time: meta.lap_time,
            distance: meta.distance,
            sectors: meta.sectors.clone(),
        }),
        telemetry: telemetry_report(&snapshot.telemetry, metadata.samples_logged),
    }
}

fn telemetry_report(samples: &[Sample], samples_logged: usize) -> TelemetryReport {
    if samples.is_empty() {
        return TelemetryReport {
            samples_logged,
            ..Default::default()
        };
    }

    let count = samples.len() as f64;
    let mean = |f: fn(&Sample) -> f64| samples.iter().map(f).sum::<f64>() / count;

    TelemetryReport {
        samples: samples.len(),
        samples_logged,
        first_distance: samples.first().map(|s| s.distance),
        last_distance: samples.last().map(|s| s.distance),
        max_speed: samples.iter().map(|s| s.speed).reduce(f64::max),
        avg_throttle: Some(mean(|s| s.throttle)),
        avg_brake: Some(mean(|s| s.brake)),
    }
}

fn print_report(report: &SnapshotReport) {
    println!("\n=== Snapshot ===\n");
    println!("Session");
    println!("  Car: {}", report.car_name);
    println!("  Track: {}", report.track_name);
    println!("  Saved: {}", report.last_save_timestamp);
    println!(
        "  State: {}",
        if report.lap_complete {
            "lap complete"
        } else {
            "lap in progress"
        }
    );
    if let Some(best) = report.best_lap_time_ms {
        println!("  Best lap: {:.3}s", best as f64 / 1000.0);
    }

    match &report.lap {
        Some(lap) => {
            println!("\nLap {}", lap.lap);
            println!("  Time: {:.3}s", lap.lap_time);
            println!("  Distance: {:.1} m", lap.distance);
            for sector in &lap.sectors {
                println!(
                    "  Sector {}: {:.1} - {:.1} m, avg {:.1} km/h",
                    sector.sector, sector.start, sector.end, sector.avg_speed
                );
            }
        }
        None => println!("\nNo completed lap"),
    }

    let telemetry = &report.telemetry;
    println!("\nTelemetry");
    println!("  Samples: {}", telemetry.samples);
    if telemetry.samples != telemetry.samples_logged {
        println!("  ⚠ samplesLogged says {}", telemetry.samples_logged);
    }
    if let (Some(first), Some(last)) = (telemetry.first_distance, telemetry.last_distance) {
        println!("  Distance: {:.1} - {:.1} m", first, last);
    }
    if let Some(max) = telemetry.max_speed {
        println!("  Max speed: {:.1} km/h", max);
    }
    if let (Some(throttle), Some(brake)) = (telemetry.avg_throttle, telemetry.avg_brake) {
        println!("  Avg throttle: {:.0}%", throttle * 100.0);
        println!("  Avg brake: {:.0}%", brake * 100.0);
    }
    println!();
}

fn print_samples(samples: &[Sample]) {
    println!("{:>10} {:>8} {:>4} {:>6} {:>6}", "dist", "speed", "gear", "thr", "brk");
    for s in samples {
        println!(
            "{:>10.1} {:>8.1} {:>4} {:>6.2} {:>6.2}",
            s.distance, s.speed, s.gear, s.throttle, s.brake
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GearLabel, LapMeta, SessionMetadata};

    fn sample(distance: f64, speed: f64, throttle: f64, brake: f64) -> Sample {
        Sample {
            distance,
            speed,
            gear: GearLabel::Forward(3),
            throttle,
            brake,
        }
    }

    fn snapshot() -> CaptureSnapshot {
        let telemetry = vec![
            sample(10.0, 120.0, 1.0, 0.0),
            sample(20.0, 180.0, 0.5, 0.0),
            sample(30.0, 90.0, 0.0, 0.6),
        ];
        CaptureSnapshot {
            metadata: SessionMetadata {
                car_name: "gt3".to_string(),
                track_name: "spa".to_string(),
                best_lap_time_ms: Some(92_500),
                samples_logged: telemetry.len(),
                last_save_timestamp: "2026-01-01 12:00:00".to_string(),
                lap_complete: true,
            },
            lap_meta: Some(LapMeta {
                lap: 1,
                lap_time: 92.5,
                distance: 30.0,
                sectors: Vec::new(),
            }),
            telemetry,
        }
    }

    #[test]
    fn test_report_statistics() {
        let report = build_report(&snapshot());

        assert_eq!(report.telemetry.samples, 3);
        assert_eq!(report.telemetry.first_distance, Some(10.0));
        assert_eq!(report.telemetry.last_distance, Some(30.0));
        assert_eq!(report.telemetry.max_speed, Some(180.0));
        assert!((report.telemetry.avg_throttle.unwrap() - 0.5).abs() < 1e-9);
        assert!((report.telemetry.avg_brake.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(report.lap.as_ref().map(|l| l.lap), Some(1));
    }

    #[test]
    fn test_empty_snapshot_report() {
        let report = build_report(&CaptureSnapshot::empty(SessionMetadata::default()));

        assert_eq!(report.telemetry.samples, 0);
        assert!(report.telemetry.max_speed.is_none());
        assert!(report.lap.is_none());
    }

    #[test]
    fn test_read_snapshot_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        std::fs::write(&path, serde_json::to_string_pretty(&snapshot()).unwrap()).unwrap();

        let loaded = read_snapshot(&path).unwrap();
        assert_eq!(loaded.telemetry.len(), 3);
        assert_eq!(loaded.metadata.car_name, "gt3");
    }

    #[test]
    fn test_read_invalid_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_snapshot(&path),
            Err(CliError::SnapshotRead { .. })
        ));
    }
}
