//! Writer metrics for observability

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Metrics for a single background writer
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// A payload is waiting in the slot
    pending: AtomicBool,
    /// Total successful writes
    write_count: AtomicU64,
    /// Total write failures
    failure_count: AtomicU64,
    /// Pending payloads overwritten by a newer request
    replaced_count: AtomicU64,
}

impl WriterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> bool {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn set_pending(&self, pending: bool) {
        self.pending.store(pending, Ordering::Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn replaced_count(&self) -> u64 {
        self.replaced_count.load(Ordering::Relaxed)
    }

    pub fn inc_replaced_count(&self) {
        self.replaced_count.fetch_add(1, Ordering::Relaxed);
    }
}
