//! 采集指标收集模块
//!
//! 通过 `metrics` facade 记录指标，并在内存中聚合，用于运行结束时的摘要。

use contracts::{LapMeta, SECTOR_COUNT};
use metrics::{counter, gauge, histogram};

/// 记录一个已缓冲的采样
pub fn record_sample(buffer_len: usize) {
    counter!("deltasync_samples_total").increment(1);
    gauge!("deltasync_buffer_len").set(buffer_len as f64);
}

/// 记录被跳过的采样步
///
/// `reason` 为简短标签，如 `sensor` 或 `out_of_range`。
pub fn record_tick_skipped(reason: &'static str) {
    counter!("deltasync_ticks_skipped_total", "reason" => reason).increment(1);
}

/// 记录完成的单圈
pub fn record_lap_finalized(meta: &LapMeta) {
    counter!("deltasync_laps_finalized_total").increment(1);
    histogram!("deltasync_lap_time_seconds").record(meta.lap_time);
    gauge!("deltasync_last_lap_distance_meters").set(meta.distance);

    for sector in &meta.sectors {
        gauge!(
            "deltasync_sector_avg_speed_kmh",
            "sector" => sector.sector.to_string()
        )
        .set(sector.avg_speed);
    }
}

/// 快照写入被记录时所处的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// 已落盘
    Success,
    /// 已交给后台写线程
    Queued,
    Failure,
}

impl WriteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Queued => "queued",
            Self::Failure => "failure",
        }
    }
}

/// 记录快照写入
///
/// `trigger` 为写入原因：`lap`、`interval`、`shutdown`，
/// 后台写入未完成圈的快照失败时为 `in_progress`。
pub fn record_snapshot_write(
    sink_name: &str,
    trigger: &'static str,
    status: WriteStatus,
    count: u64,
) {
    counter!(
        "deltasync_snapshot_writes_total",
        "sink" => sink_name.to_string(),
        "trigger" => trigger,
        "status" => status.as_str()
    )
    .increment(count);
}

/// 采集指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct CaptureMetricsAggregator {
    pub total_samples: u64,

    pub skipped_ticks: u64,

    pub laps_finalized: u64,

    pub snapshot_writes: u64,

    pub write_failures: u64,

    /// 最快完整圈（秒）
    pub best_lap_time: Option<f64>,

    pub lap_time_stats: RunningStats,

    pub lap_distance_stats: RunningStats,

    /// 各分段跨圈平均速度
    pub sector_speed_stats: [RunningStats; SECTOR_COUNT],
}

impl CaptureMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&mut self) {
        self.total_samples += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped_ticks += 1;
    }

    pub fn record_write(&mut self, success: bool) {
        if success {
            self.snapshot_writes += 1;
        } else {
            self.write_failures += 1;
        }
    }

    /// 写入已按 queued 计数后才上报的失败
    pub fn record_deferred_failures(&mut self, failed: u64) {
        self.write_failures += failed;
    }

    /// 把完成的单圈并入圈统计
    pub fn record_lap(&mut self, meta: &LapMeta) {
        self.laps_finalized += 1;
        self.lap_time_stats.push(meta.lap_time);
        self.lap_distance_stats.push(meta.distance);

        self.best_lap_time = Some(match self.best_lap_time {
            Some(best) => best.min(meta.lap_time),
            None => meta.lap_time,
        });

        for sector in &meta.sectors {
            let index = usize::from(sector.sector.saturating_sub(1));
            if let Some(stats) = self.sector_speed_stats.get_mut(index) {
                stats.push(sector.avg_speed);
            }
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let attempts = self.total_samples + self.skipped_ticks;
        MetricsSummary {
            total_samples: self.total_samples,
            skipped_ticks: self.skipped_ticks,
            skip_rate: if attempts > 0 {
                self.skipped_ticks as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            laps_finalized: self.laps_finalized,
            snapshot_writes: self.snapshot_writes,
            write_failures: self.write_failures,
            best_lap_time: self.best_lap_time,
            lap_time: StatsSummary::from(&self.lap_time_stats),
            lap_distance: StatsSummary::from(&self.lap_distance_stats),
            sector_speed: self.sector_speed_stats.each_ref().map(StatsSummary::from),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_samples: u64,
    pub skipped_ticks: u64,
    pub skip_rate: f64,
    pub laps_finalized: u64,
    pub snapshot_writes: u64,
    pub write_failures: u64,
    pub best_lap_time: Option<f64>,
    pub lap_time: StatsSummary,
    pub lap_distance: StatsSummary,
    pub sector_speed: [StatsSummary; SECTOR_COUNT],
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Capture Summary ===")?;
        writeln!(f, "Samples: {}", self.total_samples)?;
        writeln!(
            f,
            "Skipped sampling steps: {} ({:.2}%)",
            self.skipped_ticks, self.skip_rate
        )?;
        writeln!(f, "Laps finalized: {}", self.laps_finalized)?;
        writeln!(
            f,
            "Snapshot writes: {} accepted, {} failed",
            self.snapshot_writes, self.write_failures
        )?;
        match self.best_lap_time {
            Some(best) => writeln!(f, "Best lap: {best:.3} s")?,
            None => writeln!(f, "Best lap: N/A")?,
        }
        writeln!(f, "Lap time (s): {}", self.lap_time)?;
        writeln!(f, "Lap distance (m): {}", self.lap_distance)?;
        for (i, sector) in self.sector_speed.iter().enumerate() {
            writeln!(f, "Sector {} avg speed (km/h): {}", i + 1, sector)?;
        }
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
