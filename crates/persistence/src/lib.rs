//! # Persistence
//!
//! 快照持久化模块。
//!
//! 负责：
//! - 原子替换快照文件（临时文件、fsync、rename）
//! - 解析会话文件名
//! - 可选：通过单槽位把写入移出 tick 主链路

pub mod atomic;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod naming;
pub mod sinks;

use std::path::PathBuf;

pub use contracts::{CaptureSnapshot, SnapshotSink};
pub use error::PersistenceError;
pub use handle::BackgroundSink;
pub use metrics::WriterMetrics;
pub use naming::{resolve_snapshot_path, sanitize, session_file_name};
pub use sinks::{JsonFileSink, LogSink};

use contracts::{PersistenceConfig, SinkKind, WriteMode};
use tracing::info;

/// Build the sink described by `config`, writing to `path`
///
/// `path` is ignored by the log sink.
pub fn create_sink(config: &PersistenceConfig, path: PathBuf) -> Box<dyn SnapshotSink> {
    info!(
        sink = ?config.sink,
        write_mode = ?config.write_mode,
        path = %path.display(),
        "Creating snapshot sink"
    );

    match (config.sink, config.write_mode) {
        (SinkKind::JsonFile, WriteMode::Inline) => Box::new(JsonFileSink::new("json_file", path)),
        (SinkKind::JsonFile, WriteMode::Background) => {
            Box::new(BackgroundSink::new(JsonFileSink::new("json_file", path)))
        }
        (SinkKind::Log, WriteMode::Inline) => Box::new(LogSink::new("log")),
        (SinkKind::Log, WriteMode::Background) => Box::new(BackgroundSink::new(LogSink::new("log"))),
    }
}
