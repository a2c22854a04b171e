// src/pipeline/metrics.rs
//
// Session observability: frame, detection, and alert counters. Cloned
// handles share the underlying counters, so the caller can keep one and
// read a summary after the session ends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub frames_processed: Arc<AtomicU64>,
    pub detections_received: Arc<AtomicU64>,
    pub detector_failures: Arc<AtomicU64>,
    pub path_alerts: Arc<AtomicU64>,
    pub critical_alerts: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            frames_processed: Arc::new(AtomicU64::new(0)),
            detections_received: Arc::new(AtomicU64::new(0)),
            detector_failures: Arc::new(AtomicU64::new(0)),
            path_alerts: Arc::new(AtomicU64::new(0)),
            critical_alerts: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.frames_processed.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            detections_received: self.detections_received.load(Ordering::Relaxed),
            detector_failures: self.detector_failures.load(Ordering::Relaxed),
            path_alerts: self.path_alerts.load(Ordering::Relaxed),
            critical_alerts: self.critical_alerts.load(Ordering::Relaxed),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub frames_processed: u64,
    pub detections_received: u64,
    pub detector_failures: u64,
    pub path_alerts: u64,
    pub critical_alerts: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_shared_across_clones() {
        let metrics = SessionMetrics::new();
        let handle = metrics.clone();

        metrics.inc(&metrics.frames_processed);
        metrics.add(&metrics.detections_received, 3);
        handle.inc(&handle.critical_alerts);

        let summary = metrics.summary();
        assert_eq!(summary.frames_processed, 1);
        assert_eq!(summary.detections_received, 3);
        assert_eq!(summary.critical_alerts, 1);
        assert_eq!(summary.path_alerts, 0);
    }
}
