use crate::config::{ProcessingConfig, ThresholdType};
use crate::math::stats::StatsHelper;
use crate::prelude::{DetectorError, DetectorResult, ThresholdCurve};

const SENSITIVITY_EPSILON: f64 = 1e-10;

/// Cell-averaging CFAR threshold over fixed sample offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct CfarThreshold {
    offsets: Vec<usize>,
    sensitivity: f64,
    one_sided: bool,
}

impl CfarThreshold {
    /// Converts the guard and window widths (in cm) into sample offsets.
    ///
    /// Offset `k` sits at `round(guard/2/dr + k)` for `k` in
    /// `0..ceil(window/dr)`, with at most `data_length` cells per side.
    pub fn new(
        guard_cm: f64,
        window_cm: f64,
        dr: f64,
        sensitivity: f64,
        one_sided: bool,
        data_length: usize,
    ) -> Self {
        let guard_half = guard_cm / 100.0 / 2.0 / dr;
        let window_len = (window_cm / 100.0 / dr)
            .ceil()
            .clamp(0.0, data_length as f64) as usize;
        let offsets = (0..window_len)
            .map(|k| StatsHelper::round_half_even(guard_half + k as f64) as usize)
            .collect();
        Self {
            offsets,
            sensitivity,
            one_sided,
        }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn compute(&self, sweep: &[f64]) -> ThresholdCurve {
        let len = sweep.len();
        let mut threshold = vec![f64::NAN; len];
        let Some(&reach) = self.offsets.iter().max() else {
            return threshold;
        };

        let end = if self.one_sided {
            len
        } else {
            len.saturating_sub(reach)
        };
        let mut cells = Vec::with_capacity(2 * self.offsets.len());
        for idx in reach..end {
            cells.clear();
            cells.extend(self.offsets.iter().map(|&off| sweep[idx - off]));
            if !self.one_sided {
                cells.extend(self.offsets.iter().map(|&off| sweep[idx + off]));
            }
            threshold[idx] = StatsHelper::mean(&cells) / (self.sensitivity + SENSITIVITY_EPSILON);
        }
        threshold
    }
}

/// Threshold strategy chosen by [`ThresholdType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Thresholder {
    Fixed(f64),
    Cfar(CfarThreshold),
    Recorded,
}

impl Thresholder {
    pub fn from_config(config: &ProcessingConfig, dr: f64, data_length: usize) -> Self {
        match config.threshold_type {
            ThresholdType::Fixed => Thresholder::Fixed(config.fixed_threshold),
            ThresholdType::Cfar => Thresholder::Cfar(CfarThreshold::new(
                config.cfar_guard_cm,
                config.cfar_window_cm,
                dr,
                config.cfar_sensitivity,
                config.cfar_one_sided,
                data_length,
            )),
            ThresholdType::Recorded => Thresholder::Recorded,
        }
    }

    /// Fails before any threshold is produced when the strategy has no computation.
    pub fn ensure_supported(&self) -> DetectorResult<()> {
        match self {
            Thresholder::Fixed(_) | Thresholder::Cfar(_) => Ok(()),
            Thresholder::Recorded => {
                Err(DetectorError::UnsupportedThreshold(ThresholdType::Recorded))
            }
        }
    }

    pub fn compute(&self, sweep: &[f64]) -> DetectorResult<ThresholdCurve> {
        match self {
            Thresholder::Fixed(level) => Ok(vec![*level; sweep.len()]),
            Thresholder::Cfar(cfar) => Ok(cfar.compute(sweep)),
            Thresholder::Recorded => {
                Err(DetectorError::UnsupportedThreshold(ThresholdType::Recorded))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_threshold_is_broadcast() {
        let thresholder = Thresholder::Fixed(800.0);
        assert_eq!(thresholder.compute(&[0.0; 4]).unwrap(), vec![800.0; 4]);
    }

    #[test]
    fn recorded_threshold_is_rejected() {
        let config = ProcessingConfig {
            threshold_type: ThresholdType::Recorded,
            ..Default::default()
        };
        let thresholder = Thresholder::from_config(&config, 0.01, 8);
        assert_eq!(
            thresholder.compute(&[1.0; 8]),
            Err(DetectorError::UnsupportedThreshold(ThresholdType::Recorded))
        );
        assert!(thresholder.ensure_supported().is_err());
    }

    #[test]
    fn cfar_offsets_follow_guard_and_window() {
        // dr = 1 cm: guard 4 cm -> 2 samples per side, window 2 cm -> 2 samples.
        let cfar = CfarThreshold::new(4.0, 2.0, 0.01, 1.0, false, 10);
        assert_eq!(cfar.offsets(), &[2, 3]);
    }

    #[test]
    fn two_sided_cfar_leaves_both_edges_undefined() {
        let cfar = CfarThreshold::new(4.0, 2.0, 0.01, 1.0, false, 10);
        let sweep: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let threshold = cfar.compute(&sweep);

        assert_eq!(threshold.len(), 10);
        for idx in [0, 1, 2, 7, 8, 9] {
            assert!(threshold[idx].is_nan(), "index {} should be undefined", idx);
        }
        // idx 3: mean of sweep[1], sweep[0], sweep[5], sweep[6] = 3.0
        assert!((threshold[3] - 3.0).abs() < 1e-6);
        assert!((threshold[6] - 6.0).abs() < 1e-6);
    }

    #[test]
    fn one_sided_cfar_runs_to_the_far_edge() {
        let cfar = CfarThreshold::new(4.0, 2.0, 0.01, 0.5, true, 8);
        let sweep = vec![2.0; 8];
        let threshold = cfar.compute(&sweep);

        assert!(threshold[..3].iter().all(|v| v.is_nan()));
        assert!(threshold[3..].iter().all(|&v| (v - 4.0).abs() < 1e-6));
    }

    #[test]
    fn cfar_on_short_sweep_is_entirely_undefined() {
        let cfar = CfarThreshold::new(4.0, 2.0, 0.01, 1.0, false, 10);
        assert!(cfar.compute(&[1.0; 5]).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn cfar_window_is_capped_at_sweep_length() {
        let cfar = CfarThreshold::new(4.0, 1e13, 0.01, 1.0, false, 6);
        assert_eq!(cfar.offsets(), &[2, 3, 4, 5, 6, 7]);
        assert!(cfar.compute(&[1.0; 6]).iter().all(|v| v.is_nan()));
    }
}
