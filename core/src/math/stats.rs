pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean; `NaN` for an empty slice.
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return f64::NAN;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Rounds to the nearest integer with ties going to the even neighbour.
    pub fn round_half_even(value: f64) -> f64 {
        value.round_ties_even()
    }

    /// First index whose amplitude strictly exceeds a defined threshold.
    pub fn first_index_above(sweep: &[f64], threshold: &[f64]) -> Option<usize> {
        sweep
            .iter()
            .zip(threshold)
            .position(|(&amplitude, &level)| amplitude > level)
    }
}
