use crate::prelude::PeakSet;

/// Scans a thresholded mean sweep for local maxima.
///
/// A peak is a single sample or a plateau of equal samples, all above their
/// threshold, with a lower above-threshold neighbour on each side. Plateaus
/// report their midpoint, rounded toward the higher index. At least three
/// consecutive samples over threshold are needed to form a peak.
pub struct PeakFinder;

impl PeakFinder {
    pub fn find(sweep: &[f64], threshold: &[f64]) -> PeakSet {
        let len = sweep.len().min(threshold.len());
        if len < 3 || threshold.iter().all(|v| v.is_nan()) {
            return Vec::new();
        }

        let mut found = Vec::new();
        let mut d = 1;
        while d < len - 1 {
            // CFAR leaves the sweep edges undefined.
            if threshold[d - 1].is_nan() {
                d += 1;
                continue;
            }
            if threshold[d + 1].is_nan() {
                break;
            }

            // Neither this nor the next sample can start a peak.
            if sweep[d] <= threshold[d] {
                d += 2;
                continue;
            }
            if sweep[d - 1] <= threshold[d - 1] || sweep[d - 1] >= sweep[d] {
                d += 1;
                continue;
            }

            let mut upper = d + 1;
            while upper < len - 1 {
                if threshold[upper].is_nan() || sweep[upper] <= threshold[upper] {
                    break;
                }
                if sweep[upper] > sweep[d] {
                    break;
                }
                if sweep[upper] < sweep[d] {
                    let plateau = upper - d;
                    found.push(d + plateau / 2);
                    break;
                }
                upper += 1;
            }
            d = upper;
        }
        found
    }
}
