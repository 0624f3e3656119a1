//! Completeness check for one-shot sources.

use std::path::Path;
use std::time::{Duration, Instant};

/// Decides whether a source file has been fully written.
///
/// With a declared size the on-disk size must match it exactly. Without one,
/// two observations taken at least `interval` apart must agree.
#[derive(Debug, Clone)]
pub struct DownloadCheck {
    interval: Duration,
    last_check: Option<Instant>,
    last_size: Option<u64>,
}

impl DownloadCheck {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_check: None,
            last_size: None,
        }
    }

    /// Stat `path` and report readiness. A missing file is never ready.
    pub fn poll(&mut self, path: &Path, declared_size: Option<u64>, now: Instant) -> bool {
        if !self.is_due(declared_size, now) {
            return false;
        }
        match std::fs::metadata(path) {
            Ok(meta) => self.observe(meta.len(), declared_size, now),
            Err(_) => false,
        }
    }

    /// Record one size observation.
    pub fn observe(&mut self, size: u64, declared_size: Option<u64>, now: Instant) -> bool {
        if let Some(total) = declared_size {
            return size == total;
        }
        if !self.is_due(None, now) {
            return false;
        }
        if self.last_size == Some(size) {
            return true;
        }
        self.last_size = Some(size);
        self.last_check = Some(now);
        false
    }

    pub fn reset(&mut self) {
        self.last_check = None;
        self.last_size = None;
    }

    fn is_due(&self, declared_size: Option<u64>, now: Instant) -> bool {
        if declared_size.is_some() {
            return true;
        }
        match self.last_check {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }
}
