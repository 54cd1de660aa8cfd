use crate::prelude::{PeakSet, SweepFrame, ThresholdCurve};
use serde::{Deserialize, Serialize};

/// One history entry relative to the reporting sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Age in seconds; zero for the current sweep, negative for older ones.
    pub offset_s: f64,
    pub distance_m: f64,
}

/// Detection results produced when an averaging batch closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub found_peaks: PeakSet,
    pub first_above_threshold: Option<usize>,
    pub main_peak_history: Vec<HistoryPoint>,
    pub minor_peaks_history: Vec<HistoryPoint>,
    pub above_threshold_history: Vec<HistoryPoint>,
}

/// Record returned for every processed sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub sweep: SweepFrame,
    pub last_mean_sweep: SweepFrame,
    pub threshold: ThresholdCurve,
    pub sweep_index: u64,
    /// Present only on calls that completed a batch.
    pub batch: Option<BatchOutcome>,
}

impl ProcessResult {
    pub fn found_peaks(&self) -> Option<&[usize]> {
        self.batch.as_ref().map(|batch| batch.found_peaks.as_slice())
    }

    pub fn is_batch_complete(&self) -> bool {
        self.batch.is_some()
    }
}
