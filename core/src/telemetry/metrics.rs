use serde::Serialize;
use std::sync::Mutex;

/// Counters shared between the detector and whoever drives it.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub sweeps: u64,
    pub batches: u64,
    pub batches_with_peaks: u64,
    pub rejected: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_sweep(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.sweeps += 1;
        }
    }

    pub fn record_batch(&self, peak_count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.batches += 1;
            if peak_count > 0 {
                metrics.batches_with_peaks += 1;
            }
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
