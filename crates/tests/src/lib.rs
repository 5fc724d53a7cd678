//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 模拟车辆与回放，一直写到快照文件
//! - 后台写入与关闭策略
//! - 中断写入后的恢复
//! - 配置往返

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        CaptureConfig, NamingPolicy, PersistencePolicy, ShutdownPolicy, SinkKind, WriteMode,
    };

    fn custom_config() -> CaptureConfig {
        let mut config = CaptureConfig::default();
        config.sampling.interval_secs = 0.1;
        config.persistence.sink = SinkKind::JsonFile;
        config.persistence.naming = NamingPolicy::Fixed;
        config.persistence.file_name = "lap.json".to_string();
        config.persistence.policy = PersistencePolicy::Interval;
        config.persistence.interval_secs = 2.0;
        config.persistence.write_mode = WriteMode::Background;
        config.persistence.on_shutdown = ShutdownPolicy::Flush;
        config
    }

    #[test]
    fn test_toml_round_trip() {
        let toml = ConfigLoader::to_toml(&custom_config()).unwrap();
        let parsed = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(parsed.sampling.interval_secs, 0.1);
        assert_eq!(parsed.persistence.file_name, "lap.json");
        assert_eq!(parsed.persistence.policy, PersistencePolicy::Interval);
        assert_eq!(parsed.persistence.write_mode, WriteMode::Background);
        assert_eq!(parsed.persistence.on_shutdown, ShutdownPolicy::Flush);
    }

    #[test]
    fn test_json_round_trip() {
        let json = ConfigLoader::to_json(&custom_config()).unwrap();
        let parsed = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert_eq!(parsed.persistence.naming, NamingPolicy::Fixed);
        assert_eq!(parsed.persistence.interval_secs, 2.0);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let parsed = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        let defaults = CaptureConfig::default();

        assert_eq!(parsed.sampling.interval_secs, defaults.sampling.interval_secs);
        assert_eq!(parsed.persistence.policy, PersistencePolicy::PerLap);
        assert_eq!(parsed.persistence.on_shutdown, ShutdownPolicy::Discard);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use capture::CaptureSession;
    use contracts::{
        CaptureConfig, CaptureSnapshot, GearLabel, NamingPolicy, PersistenceConfig,
        PersistencePolicy, SamplingConfig, ShutdownPolicy, WriteMode, SECTOR_COUNT,
    };
    use sim_host::{
        ChannelReadings, RecordingStatusReporter, ReplayAdapter, ReplayConfig, SimulatedVehicle,
        SimulatedVehicleConfig,
    };

    const TICK: f64 = 0.05;

    fn fixed_file_config(dir: &Path) -> CaptureConfig {
        CaptureConfig {
            sampling: SamplingConfig { interval_secs: 0.25 },
            persistence: PersistenceConfig {
                output_dir: dir.to_path_buf(),
                naming: NamingPolicy::Fixed,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn short_track() -> SimulatedVehicle {
        SimulatedVehicle::new(SimulatedVehicleConfig {
            track_length_m: 300.0,
            car_name: "gt3 rs".to_string(),
            track_name: "test ring".to_string(),
            ..Default::default()
        })
    }

    fn read_snapshot(path: &Path) -> CaptureSnapshot {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    /// Host loop: advance the vehicle, then hand the same dt to the session
    fn drive(session: &mut CaptureSession, vehicle: &SimulatedVehicle, seconds: f64) {
        let ticks = (seconds / TICK).round() as usize;
        for _ in 0..ticks {
            vehicle.advance(TICK);
            session.tick(TICK);
        }
    }

    fn assert_consistent(snapshot: &CaptureSnapshot) {
        assert_eq!(snapshot.metadata.samples_logged, snapshot.telemetry.len());
        assert!(snapshot
            .telemetry
            .windows(2)
            .all(|w| w[1].distance >= w[0].distance));

        if let Some(meta) = &snapshot.lap_meta {
            assert_eq!(meta.sectors.len(), SECTOR_COUNT);
            assert_eq!(meta.sectors[0].start, 0.0);
            assert!((meta.sectors[2].end - meta.distance).abs() < 1e-6);
            for pair in meta.sectors.windows(2) {
                assert!((pair[0].end - pair[1].start).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_simulated_laps_to_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let vehicle = short_track();
        let mut session = CaptureSession::init(
            fixed_file_config(dir.path()),
            vehicle.clone(),
            RecordingStatusReporter::new(),
        )
        .unwrap();

        let path = dir.path().join("telemetry.json");
        let initial = read_snapshot(&path);
        assert!(initial.lap_meta.is_none());
        assert!(initial.telemetry.is_empty());
        assert_eq!(initial.metadata.car_name, "gt3 rs");

        drive(&mut session, &vehicle, 60.0);
        assert!(vehicle.lap() >= 2);

        let summary = session.shutdown().unwrap();
        assert!(summary.laps_finalized >= 1);
        assert_eq!(summary.write_failures, 0);

        let snapshot = read_snapshot(&path);
        assert!(snapshot.metadata.lap_complete);
        assert!(snapshot.metadata.best_lap_time_ms.is_some());
        assert!(!snapshot.telemetry.is_empty());
        assert_consistent(&snapshot);

        let meta = snapshot.lap_meta.unwrap();
        assert!(meta.lap < vehicle.lap());
        assert!(meta.lap_time > 0.0);
        // Integrated distance tracks the real lap length to within a sample step
        assert!((meta.distance - 300.0).abs() < 60.0, "distance {}", meta.distance);
    }

    #[test]
    fn test_session_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let vehicle = short_track();
        let mut config = fixed_file_config(dir.path());
        config.persistence.naming = NamingPolicy::Session;

        let session =
            CaptureSession::init(config, vehicle, RecordingStatusReporter::new()).unwrap();
        let path = session.snapshot_path().unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();

        assert!(name.starts_with("telemetry_test_ring_gt3_rs_"), "{name}");
        assert!(name.ends_with(".json"));
        assert!(path.exists());
        session.shutdown().unwrap();
    }

    #[test]
    fn test_background_write_mode() {
        let dir = tempfile::tempdir().unwrap();
        let vehicle = short_track();
        let mut config = fixed_file_config(dir.path());
        config.persistence.write_mode = WriteMode::Background;

        let mut session =
            CaptureSession::init(config, vehicle.clone(), RecordingStatusReporter::new())
                .unwrap();
        drive(&mut session, &vehicle, 45.0);
        let summary = session.shutdown().unwrap();

        assert!(summary.laps_finalized >= 1);
        assert_eq!(summary.write_failures, 0);

        let snapshot = read_snapshot(&dir.path().join("telemetry.json"));
        assert!(snapshot.metadata.lap_complete);
        assert!(snapshot.lap_meta.is_some());
        assert_consistent(&snapshot);
        assert!(!persistence::atomic::temp_path(&dir.path().join("telemetry.json")).exists());
    }

    #[test]
    fn test_flush_on_shutdown_writes_partial_lap() {
        let dir = tempfile::tempdir().unwrap();
        let vehicle = short_track();
        let mut config = fixed_file_config(dir.path());
        config.persistence.on_shutdown = ShutdownPolicy::Flush;

        let mut session =
            CaptureSession::init(config, vehicle.clone(), RecordingStatusReporter::new())
                .unwrap();
        // Stop mid-lap
        drive(&mut session, &vehicle, 4.0);
        assert_eq!(vehicle.lap(), 0);
        let in_progress = session.buffer().len();
        assert!(in_progress > 0);
        session.shutdown().unwrap();

        let snapshot = read_snapshot(&dir.path().join("telemetry.json"));
        assert!(!snapshot.metadata.lap_complete);
        assert_eq!(snapshot.telemetry.len(), in_progress);
        let meta = snapshot.lap_meta.as_ref().unwrap();
        assert_eq!(meta.lap, 0);
        let last = snapshot.telemetry.last().unwrap();
        assert!((meta.distance - last.distance).abs() < 1e-9);
        assert!(meta.lap_time > 0.0);
        assert_consistent(&snapshot);
    }

    #[test]
    fn test_interval_policy_saves_in_progress_lap() {
        let dir = tempfile::tempdir().unwrap();
        let vehicle = short_track();
        let mut config = fixed_file_config(dir.path());
        config.persistence.policy = PersistencePolicy::Interval;
        config.persistence.interval_secs = 1.0;

        let mut session =
            CaptureSession::init(config, vehicle.clone(), RecordingStatusReporter::new())
                .unwrap();
        drive(&mut session, &vehicle, 3.0);

        let snapshot = read_snapshot(&dir.path().join("telemetry.json"));
        assert!(!snapshot.metadata.lap_complete);
        assert!(!snapshot.telemetry.is_empty());
        session.shutdown().unwrap();
    }

    #[test]
    fn test_interrupted_write_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");

        // A complete snapshot from an earlier session plus the leftovers of a
        // write that died before its rename
        let mut previous = CaptureSnapshot::empty(Default::default());
        previous.metadata.car_name = "previous".to_string();
        previous.metadata.lap_complete = true;
        std::fs::write(&path, serde_json::to_string_pretty(&previous).unwrap()).unwrap();
        let temp = persistence::atomic::temp_path(&path);
        let mut partial = std::fs::File::create(&temp).unwrap();
        partial.write_all(b"{\"metadata\": {\"carName\": \"trunc").unwrap();
        drop(partial);

        let vehicle = short_track();
        let mut session = CaptureSession::init(
            fixed_file_config(dir.path()),
            vehicle.clone(),
            RecordingStatusReporter::new(),
        )
        .unwrap();

        // Startup keeps the existing file untouched
        assert_eq!(read_snapshot(&path), previous);

        drive(&mut session, &vehicle, 30.0);
        session.shutdown().unwrap();

        let snapshot = read_snapshot(&path);
        assert_eq!(snapshot.metadata.car_name, "gt3 rs");
        assert!(snapshot.lap_meta.is_some());
        assert!(!temp.exists());
    }

    fn write_recording(dir: &Path) -> PathBuf {
        let path = dir.join("recording.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();

        // 360 km/h, lap counter bumps at t = 5 s and t = 10 s
        for i in 0..=240 {
            let t = i as f64 * 0.05;
            let lap = (t / 5.0).floor();
            let readings = ChannelReadings {
                speed: 360.0,
                gear: 4.0,
                throttle: 1.0,
                brake: 0.0,
                lap,
                ..Default::default()
            };
            let mut record = serde_json::to_value(&readings).unwrap();
            record["t"] = serde_json::json!(t);
            writeln!(file, "{}", record).unwrap();
        }
        path
    }

    #[test]
    fn test_replay_capture() {
        let dir = tempfile::tempdir().unwrap();
        let recording = write_recording(dir.path());
        let replay = ReplayAdapter::load(
            &recording,
            ReplayConfig {
                car_name: Some("replay_car".to_string()),
                track_name: Some("replay_track".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let reporter = RecordingStatusReporter::new();
        let mut session = CaptureSession::init(
            fixed_file_config(dir.path()),
            replay.clone(),
            reporter.clone(),
        )
        .unwrap();

        let mut guard = 0;
        while !replay.is_finished() && guard < 1_000 {
            replay.advance(TICK);
            session.tick(TICK);
            guard += 1;
        }
        assert!(replay.is_finished());
        session.shutdown().unwrap();

        let snapshot = read_snapshot(&dir.path().join("telemetry.json"));
        assert_eq!(snapshot.metadata.car_name, "replay_car");
        assert_eq!(snapshot.metadata.track_name, "replay_track");
        assert!(snapshot.metadata.lap_complete);
        assert_consistent(&snapshot);

        let meta = snapshot.lap_meta.unwrap();
        assert_eq!(meta.lap, 1);
        assert!((meta.distance - 500.0).abs() <= 50.0, "distance {}", meta.distance);
        for sector in &meta.sectors {
            assert!((sector.avg_speed - 360.0).abs() < 1e-9);
        }
        assert!(snapshot
            .telemetry
            .iter()
            .all(|s| s.gear == GearLabel::Forward(3)));

        let status = reporter.current().unwrap();
        assert!(status.starts_with("Spd:360 | G:3"), "{status}");
    }
}
