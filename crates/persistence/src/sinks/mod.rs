//! Sink implementations
//!
//! Contains JsonFileSink and LogSink.

mod json_file;
mod log;

pub use self::json_file::JsonFileSink;
pub use self::log::LogSink;
