use log::{debug, info, warn};

/// Thin wrapper that keeps detector log lines under one target.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            target: "peakcore::detector",
        }
    }

    pub fn record(&self, message: &str) {
        info!(target: self.target, "{}", message);
    }

    pub fn advise(&self, message: &str) {
        warn!(target: self.target, "{}", message);
    }

    pub fn record_batch(&self, sweep_index: u64, peaks: &[usize], main_distance_m: Option<f64>) {
        match main_distance_m {
            Some(distance) => debug!(
                target: self.target,
                "sweep {} closed batch: {} peak(s), main at {:.4} m",
                sweep_index,
                peaks.len(),
                distance
            ),
            None => debug!(target: self.target, "sweep {} closed batch: no peaks", sweep_index),
        }
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
