//! Host loop driving a capture session.

mod orchestrator;
mod stats;

pub use orchestrator::{tick_period, HostLoop, HostLoopConfig, HostSource, MIN_TICK_PERIOD};
pub use stats::RunStats;
