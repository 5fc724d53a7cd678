//! # Capture
//!
//! 单圈遥测采集管线。
//!
//! 负责：
//! - 累计宿主时间，判定哪些 tick 是采样步
//! - 读取并校验传感器通道
//! - 检测圈边界，按分段统计完成单圈
//! - 把完整快照交给持久化 sink
//!
//! ## 使用示例
//!
//! ```ignore
//! use capture::CaptureSession;
//!
//! let mut session = CaptureSession::init(config, adapter, reporter)?;
//!
//! // once per host update
//! session.tick(dt);
//!
//! let summary = session.shutdown()?;
//! ```

mod buffer;
mod error;
pub mod sampler;
pub mod sectors;
pub mod segmenter;
mod session;

pub use buffer::TelemetryBuffer;
pub use error::CaptureError;
pub use sampler::{Reading, Sampler};
pub use sectors::compute_sectors;
pub use segmenter::{LapSegmenter, Step};
pub use session::CaptureSession;

pub use contracts::{CaptureConfig, CaptureSnapshot, LapMeta, Sample, SectorStat};
