//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::CaptureConfig;
use sim_host::{ReplayAdapter, ReplayConfig, SimulatedVehicle, SimulatedVehicleConfig};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::host::{tick_period, HostLoop, HostLoopConfig, HostSource, MIN_TICK_PERIOD};

/// Execute the `run` command
pub async fn run_capture(args: &RunArgs) -> Result<()> {
    check_args(args)?;

    let mut config = load_config(args)?;
    if let Some(ref dir) = args.output_dir {
        info!(output_dir = %dir.display(), "Overriding output directory from CLI");
        config.persistence.output_dir = dir.clone();
    }
    config_loader::ConfigLoader::validate(&config).map_err(CliError::from)?;

    info!(
        interval_secs = config.sampling.interval_secs,
        sink = ?config.persistence.sink,
        policy = ?config.persistence.policy,
        write_mode = ?config.persistence.write_mode,
        on_shutdown = ?config.persistence.on_shutdown,
        output_dir = %config.persistence.output_dir.display(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config, args);
        return Ok(());
    }

    let source = build_source(args)?;

    let host = HostLoop::new(HostLoopConfig {
        capture: config,
        source,
        tick: args.tick,
        duration: (args.duration > 0.0).then_some(args.duration),
        speedup: args.speedup,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    info!("Starting capture...");
    let stats = host
        .run(shutdown_signal())
        .await
        .context("Capture failed")?;

    info!(
        ticks = stats.ticks,
        sim_seconds = stats.sim_seconds,
        laps = stats.summary.laps_finalized,
        samples = stats.summary.total_samples,
        "Capture completed"
    );
    stats.print_summary();

    Ok(())
}

fn check_args(args: &RunArgs) -> Result<(), CliError> {
    let positive = |arg: &'static str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(CliError::invalid_argument(
                arg,
                format!("must be a positive number, got {value}"),
            ))
        }
    };

    positive("tick", args.tick)?;
    positive("speedup", args.speedup)?;
    positive("replay-speed", args.replay_speed)?;
    positive("track-length", args.track_length)?;
    if tick_period(args.tick, args.speedup).is_none() {
        return Err(CliError::invalid_argument(
            "speedup",
            format!(
                "tick / speedup must be a wall-clock period of at least {:?}, got {} / {}",
                MIN_TICK_PERIOD, args.tick, args.speedup
            ),
        ));
    }
    if !(args.duration.is_finite() && args.duration >= 0.0) {
        return Err(CliError::invalid_argument("duration", "must be >= 0"));
    }
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<CaptureConfig, CliError> {
    match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path));
            }
            info!(config = %path.display(), "Loading configuration");
            Ok(config_loader::ConfigLoader::load_from_path(path)?)
        }
        None => {
            info!("No configuration file given, using defaults");
            Ok(CaptureConfig::default())
        }
    }
}

fn build_source(args: &RunArgs) -> Result<HostSource, CliError> {
    match &args.replay {
        Some(path) => {
            let replay = ReplayAdapter::load(
                path,
                ReplayConfig {
                    speed_multiplier: args.replay_speed,
                    loop_playback: args.replay_loop,
                    car_name: args.car.clone(),
                    track_name: args.track.clone(),
                },
            )
            .map_err(|e| CliError::replay(path, e))?;

            if args.replay_loop && args.duration == 0.0 {
                warn!("Looping replay without --duration runs until Ctrl+C");
            }
            Ok(HostSource::Replay(replay))
        }
        None => {
            let defaults = SimulatedVehicleConfig::default();
            let vehicle = SimulatedVehicle::new(SimulatedVehicleConfig {
                track_length_m: args.track_length,
                car_name: args.car.clone().unwrap_or(defaults.car_name.clone()),
                track_name: args.track.clone().unwrap_or(defaults.track_name.clone()),
                ..defaults
            });
            Ok(HostSource::Simulated(vehicle))
        }
    }
}

/// Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &CaptureConfig, args: &RunArgs) {
    let persistence = &config.persistence;

    println!("\n=== Configuration Summary ===\n");
    println!("Sampling:");
    println!("  Interval: {}s", config.sampling.interval_secs);
    println!("\nPersistence:");
    println!("  Sink: {:?}", persistence.sink);
    println!("  Output dir: {}", persistence.output_dir.display());
    println!("  Naming: {:?}", persistence.naming);
    println!("  Policy: {:?}", persistence.policy);
    if persistence.policy == contracts::PersistencePolicy::Interval {
        println!("  Save interval: {}s", persistence.interval_secs);
    }
    println!("  Write mode: {:?}", persistence.write_mode);
    println!("  On shutdown: {:?}", persistence.on_shutdown);
    println!("\nHost:");
    match &args.replay {
        Some(path) => println!("  Replay: {} (x{})", path.display(), args.replay_speed),
        None => println!("  Simulated vehicle, {} m lap", args.track_length),
    }
    println!("  Tick: {}s", args.tick);
    println!();
}
