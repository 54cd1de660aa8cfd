use crate::session::HistoryPoint;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub sweep_index: u64,
    pub distance_m: f64,
}

/// Insertion-ordered distance series, trimmed from the front by age.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryBuffer {
    pub fn push(&mut self, sweep_index: u64, distance_m: f64) {
        self.entries.push_back(HistoryEntry {
            sweep_index,
            distance_m,
        });
    }

    /// Drops leading entries older than `max_age_sweeps`.
    pub fn prune(&mut self, current_index: u64, max_age_sweeps: f64) {
        while let Some(oldest) = self.entries.front() {
            if (current_index.saturating_sub(oldest.sweep_index)) as f64 > max_age_sweeps {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Converts the series to offsets in seconds relative to `current_index`.
    pub fn relative_to(&self, current_index: u64, update_rate: f64) -> Vec<HistoryPoint> {
        self.entries
            .iter()
            .map(|entry| HistoryPoint {
                offset_s: (entry.sweep_index as f64 - current_index as f64) / update_rate,
                distance_m: entry.distance_m,
            })
            .collect()
    }
}

/// Keeps the main-peak, minor-peak and first-above-threshold series.
pub struct HistoryTracker {
    pub main_peak: HistoryBuffer,
    pub minor_peaks: HistoryBuffer,
    pub above_threshold: HistoryBuffer,
    history_length_s: f64,
    update_rate: f64,
}

impl HistoryTracker {
    pub fn new(history_length_s: f64, update_rate: f64) -> Self {
        Self {
            main_peak: HistoryBuffer::default(),
            minor_peaks: HistoryBuffer::default(),
            above_threshold: HistoryBuffer::default(),
            history_length_s,
            update_rate,
        }
    }

    pub fn set_history_length(&mut self, history_length_s: f64) {
        self.history_length_s = history_length_s;
    }

    pub fn max_age_sweeps(&self) -> f64 {
        self.history_length_s * self.update_rate
    }

    /// Records one closed batch and trims all three series.
    pub fn record(
        &mut self,
        sweep_index: u64,
        ranked_peaks: &[usize],
        first_above_threshold: Option<usize>,
        depths: &[f64],
    ) {
        if let Some((&main, minor)) = ranked_peaks.split_first() {
            self.main_peak.push(sweep_index, depths[main]);
            for &idx in minor {
                self.minor_peaks.push(sweep_index, depths[idx]);
            }
        }
        if let Some(idx) = first_above_threshold {
            self.above_threshold.push(sweep_index, depths[idx]);
        }

        let max_age = self.max_age_sweeps();
        self.main_peak.prune(sweep_index, max_age);
        self.minor_peaks.prune(sweep_index, max_age);
        self.above_threshold.prune(sweep_index, max_age);
    }
}
