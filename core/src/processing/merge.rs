use crate::math::stats::StatsHelper;
use crate::prelude::PeakSet;

/// Physical distance below which neighbouring peaks are one reflector.
pub const PEAK_MERGE_LIMIT_M: f64 = 0.005;

/// Greedy clustering of nearby peak candidates.
pub struct PeakMerger {
    max_range: usize,
}

impl PeakMerger {
    pub fn new(dr: f64) -> Self {
        Self::with_range(StatsHelper::round_half_even(PEAK_MERGE_LIMIT_M / dr).max(0.0) as usize)
    }

    pub fn with_range(max_range: usize) -> Self {
        Self { max_range }
    }

    pub fn max_range(&self) -> usize {
        self.max_range
    }

    /// Repeatedly replaces the densest cluster by its rounded mean index.
    ///
    /// Ties on cluster size go to the lowest index, which decides the surviving
    /// centroid when several clusters are equally dense.
    pub fn merge(&self, peaks: &[usize]) -> PeakSet {
        let mut merged = peaks.to_vec();
        merged.sort_unstable();

        loop {
            let mut best: Option<(usize, usize)> = None;
            for &peak in &merged {
                let neighbours = merged
                    .iter()
                    .filter(|&&other| other.abs_diff(peak) < self.max_range)
                    .count();
                if best.map_or(true, |(_, count)| neighbours > count) {
                    best = Some((peak, neighbours));
                }
            }

            let Some((center, count)) = best else {
                break;
            };
            if count <= 1 {
                break;
            }

            let (cluster, rest): (Vec<usize>, Vec<usize>) = merged
                .iter()
                .partition(|&&other| other.abs_diff(center) < self.max_range);
            let mean = cluster.iter().sum::<usize>() as f64 / cluster.len() as f64;

            merged = rest;
            merged.push(StatsHelper::round_half_even(mean) as usize);
            merged.sort_unstable();
        }
        merged
    }
}
