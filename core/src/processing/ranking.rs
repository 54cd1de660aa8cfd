use crate::config::PeakSorting;
use crate::prelude::PeakSet;

/// Orders peaks by the configured priority metric, best first.
pub struct PeakRanker;

impl PeakRanker {
    /// Sort key for one peak; smaller keys rank higher.
    pub fn key(sorting: PeakSorting, amplitude: f64, range_m: f64) -> f64 {
        match sorting {
            PeakSorting::Closest => range_m,
            PeakSorting::Strongest => -amplitude,
            PeakSorting::StrongestReflector => -amplitude * range_m * range_m,
            PeakSorting::StrongestFlatReflector => -amplitude * range_m,
        }
    }

    /// Stable sort, so equal keys keep their index order.
    pub fn rank(peaks: &[usize], sweep: &[f64], depths: &[f64], sorting: PeakSorting) -> PeakSet {
        let mut keyed: Vec<(f64, usize)> = peaks
            .iter()
            .map(|&idx| (Self::key(sorting, sweep[idx], depths[idx]), idx))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, idx)| idx).collect()
    }
}
