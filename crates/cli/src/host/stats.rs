//! Run statistics.

use std::path::PathBuf;
use std::time::Duration;

use observability::MetricsSummary;

/// Statistics from one `run`
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Host updates delivered to the session
    pub ticks: u64,

    /// Session clock at shutdown
    pub sim_seconds: f64,

    pub wall_time: Duration,

    /// Stopped by a signal rather than by duration or replay end
    pub interrupted: bool,

    /// Snapshot file, when the sink writes one
    pub snapshot_path: Option<PathBuf>,

    pub summary: MetricsSummary,
}

impl RunStats {
    /// Simulation seconds per wall-clock second
    pub fn realtime_factor(&self) -> f64 {
        let wall = self.wall_time.as_secs_f64();
        if wall > 0.0 {
            self.sim_seconds / wall
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Run Statistics ===\n");
        println!("Overview");
        println!("  Host ticks: {}", self.ticks);
        println!("  Simulated time: {:.2}s", self.sim_seconds);
        println!("  Wall time: {:.2}s", self.wall_time.as_secs_f64());
        println!("  Realtime factor: {:.1}x", self.realtime_factor());
        if self.interrupted {
            println!("  Stopped by signal");
        }
        match &self.snapshot_path {
            Some(path) => println!("  Snapshot: {}", path.display()),
            None => println!("  Snapshot: (not persisted)"),
        }
        println!();
        print!("{}", self.summary);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_factor() {
        let stats = RunStats {
            sim_seconds: 120.0,
            wall_time: Duration::from_secs(4),
            ..Default::default()
        };
        assert!((stats.realtime_factor() - 30.0).abs() < 1e-9);
        assert_eq!(RunStats::default().realtime_factor(), 0.0);
    }
}
