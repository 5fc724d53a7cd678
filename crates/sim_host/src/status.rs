//! Status reporters - stand-ins for the host's on-screen label

use std::sync::Arc;

use contracts::StatusReporter;
use parking_lot::Mutex;
use tracing::debug;

/// Emits every status line as a tracing event
#[derive(Debug, Clone)]
pub struct LogStatusReporter {
    name: String,
}

impl LogStatusReporter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl StatusReporter for LogStatusReporter {
    fn set_text(&mut self, text: &str) {
        debug!(label = %self.name, status = text, "Status updated");
    }
}

/// Keeps every status line in memory
///
/// Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusReporter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingStatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines received so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Text currently on display
    pub fn current(&self) -> Option<String> {
        self.lines.lock().last().cloned()
    }
}

impl StatusReporter for RecordingStatusReporter {
    fn set_text(&mut self, text: &str) {
        self.lines.lock().push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter() {
        let reporter = RecordingStatusReporter::new();
        let mut handle = reporter.clone();

        assert!(reporter.current().is_none());
        handle.set_text("Spd:100 | G:3 | Th:50% | Br:0%");
        handle.set_text("Spd:101 | G:3 | Th:50% | Br:0%");

        assert_eq!(reporter.lines().len(), 2);
        assert_eq!(reporter.current().unwrap(), "Spd:101 | G:3 | Th:50% | Br:0%");
    }
}
