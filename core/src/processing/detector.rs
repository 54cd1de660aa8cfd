use crate::config::{ProcessingConfig, ThresholdType};
use crate::math::stats::StatsHelper;
use crate::prelude::{DetectorError, DetectorResult, SweepFrame, ThresholdCurve};
use crate::processing::averager::Averager;
use crate::processing::history::HistoryTracker;
use crate::processing::merge::PeakMerger;
use crate::processing::peaks::PeakFinder;
use crate::processing::ranking::PeakRanker;
use crate::processing::threshold::Thresholder;
use crate::session::{BatchOutcome, ProcessResult, SensorConfig, SessionInfo};
use crate::telemetry::{LogManager, MetricsRecorder};
use std::sync::Arc;

/// Mutable per-session state, changed only by [`PeakDetector::process`].
pub struct DetectorState {
    averager: Averager,
    last_mean_sweep: SweepFrame,
    sweep_index: u64,
    history: HistoryTracker,
}

impl DetectorState {
    fn new(data_length: usize, config: &ProcessingConfig, update_rate: f64) -> Self {
        Self {
            averager: Averager::new(data_length, config.nbr_average),
            last_mean_sweep: vec![f64::NAN; data_length],
            sweep_index: 0,
            history: HistoryTracker::new(config.history_length_s, update_rate),
        }
    }

    pub fn current_mean_sweep(&self) -> &[f64] {
        self.averager.current_mean()
    }

    pub fn last_mean_sweep(&self) -> &[f64] {
        &self.last_mean_sweep
    }

    pub fn sweeps_since_mean(&self) -> u32 {
        self.averager.sweeps_since_mean()
    }

    pub fn sweep_index(&self) -> u64 {
        self.sweep_index
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }
}

/// Streaming detector turning envelope sweeps into ranked reflector distances.
///
/// One instance serves one sensor session; calls must not overlap.
pub struct PeakDetector {
    config: ProcessingConfig,
    update_rate: f64,
    depths: Vec<f64>,
    dr: f64,
    thresholder: Thresholder,
    merger: PeakMerger,
    state: DetectorState,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl PeakDetector {
    pub fn create(
        sensor: &SensorConfig,
        processing: &ProcessingConfig,
        session: &SessionInfo,
    ) -> DetectorResult<Self> {
        let update_rate = sensor
            .update_rate
            .ok_or_else(|| DetectorError::Config("sensor update_rate must be set".into()))?;
        if !(update_rate.is_finite() && update_rate > 0.0) {
            return Err(DetectorError::Config(format!(
                "sensor update_rate must be positive, got {}",
                update_rate
            )));
        }
        processing.validate()?;

        let depths = session.range_depths()?;
        let dr = depths[1] - depths[0];
        let logger = LogManager::new();

        if !sensor.noise_level_normalization && processing.threshold_type == ThresholdType::Fixed {
            logger.advise("noise level normalization is recommended with a fixed threshold");
        }
        logger.record(&format!(
            "detector created: {} samples, dr {:.5} m, {} Hz, {} threshold, batch of {}",
            depths.len(),
            dr,
            update_rate,
            processing.threshold_type,
            processing.batch_size()
        ));

        Ok(Self {
            config: processing.clone(),
            update_rate,
            thresholder: Thresholder::from_config(processing, dr, depths.len()),
            merger: PeakMerger::new(dr),
            state: DetectorState::new(depths.len(), processing, update_rate),
            depths,
            dr,
            metrics: Arc::new(MetricsRecorder::new()),
            logger,
        })
    }

    /// Routes counters into a recorder shared with the caller.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Swaps in new processing parameters without resetting the running state.
    pub fn update_processing_config(&mut self, config: ProcessingConfig) -> DetectorResult<()> {
        config.validate()?;
        self.state.averager.set_batch_size(config.nbr_average);
        self.state.history.set_history_length(config.history_length_s);
        self.thresholder = Thresholder::from_config(&config, self.dr, self.depths.len());
        self.logger.record(&format!(
            "processing config updated: {} threshold, {:?} sorting, batch of {}",
            config.threshold_type,
            config.peak_sorting_type,
            config.batch_size()
        ));
        self.config = config;
        Ok(())
    }

    pub fn process(&mut self, sweep: &[f64]) -> DetectorResult<ProcessResult> {
        if let Err(err) = self.check_sweep(sweep) {
            self.metrics.record_rejected();
            return Err(err);
        }
        if let Err(err) = self.thresholder.ensure_supported() {
            self.metrics.record_rejected();
            return Err(err);
        }

        self.state.averager.accumulate(sweep);
        let threshold = self.thresholder.compute(self.state.averager.current_mean())?;

        let batch = match self.state.averager.take_completed() {
            Some(mean) => {
                self.state.last_mean_sweep = mean;
                Some(self.detect(&threshold))
            }
            None => None,
        };

        let result = ProcessResult {
            sweep: sweep.to_vec(),
            last_mean_sweep: self.state.last_mean_sweep.clone(),
            threshold,
            sweep_index: self.state.sweep_index,
            batch,
        };
        self.metrics.record_sweep();
        self.state.sweep_index += 1;
        Ok(result)
    }

    fn check_sweep(&self, sweep: &[f64]) -> DetectorResult<()> {
        if sweep.len() != self.depths.len() {
            return Err(DetectorError::InvalidSweep(format!(
                "expected {} samples, got {}",
                self.depths.len(),
                sweep.len()
            )));
        }
        if let Some(idx) = sweep.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(DetectorError::InvalidSweep(format!(
                "sample {} is {}",
                idx, sweep[idx]
            )));
        }
        Ok(())
    }

    fn detect(&mut self, threshold: &ThresholdCurve) -> BatchOutcome {
        let mean = &self.state.last_mean_sweep;
        let sweep_index = self.state.sweep_index;

        let first_above_threshold = if self.config.show_first_above_threshold {
            StatsHelper::first_index_above(mean, threshold)
        } else {
            None
        };

        let mut peaks = PeakFinder::find(mean, threshold);
        if peaks.len() > 1 {
            peaks = self.merger.merge(&peaks);
            peaks = PeakRanker::rank(&peaks, mean, &self.depths, self.config.peak_sorting_type);
        }

        self.state
            .history
            .record(sweep_index, &peaks, first_above_threshold, &self.depths);
        self.metrics.record_batch(peaks.len());
        self.logger.record_batch(
            sweep_index,
            &peaks,
            peaks.first().map(|&idx| self.depths[idx]),
        );

        let history = &self.state.history;
        BatchOutcome {
            main_peak_history: history.main_peak.relative_to(sweep_index, self.update_rate),
            minor_peaks_history: history.minor_peaks.relative_to(sweep_index, self.update_rate),
            above_threshold_history: history
                .above_threshold
                .relative_to(sweep_index, self.update_rate),
            found_peaks: peaks,
            first_above_threshold,
        }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn range_depths(&self) -> &[f64] {
        &self.depths
    }

    pub fn update_rate(&self) -> f64 {
        self.update_rate
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        Arc::clone(&self.metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeakSorting;

    fn sensor(update_rate: f64, range: [f64; 2]) -> SensorConfig {
        SensorConfig {
            update_rate: Some(update_rate),
            range_interval: range,
            noise_level_normalization: true,
        }
    }

    fn detector(update_rate: f64, data_length: usize, config: &ProcessingConfig) -> PeakDetector {
        let sensor = sensor(update_rate, [0.0, 1.0]);
        let session = SessionInfo::for_sensor(&sensor, data_length);
        PeakDetector::create(&sensor, config, &session).unwrap()
    }

    fn bump(data_length: usize, center: usize, shape: &[f64]) -> Vec<f64> {
        let mut sweep = vec![0.0; data_length];
        let start = center - shape.len() / 2;
        sweep[start..start + shape.len()].copy_from_slice(shape);
        sweep
    }

    #[test]
    fn narrow_spike_is_found_on_fifth_sweep() {
        let config = ProcessingConfig {
            nbr_average: 5.0,
            fixed_threshold: 800.0,
            ..Default::default()
        };
        let mut det = detector(20.0, 100, &config);
        let sweep = bump(100, 50, &[900.0, 1000.0, 900.0]);

        for call in 0..4 {
            let result = det.process(&sweep).unwrap();
            assert!(result.batch.is_none(), "call {} closed a batch early", call);
            assert!(result.last_mean_sweep.iter().all(|v| v.is_nan()));
        }
        let result = det.process(&sweep).unwrap();
        assert_eq!(result.sweep_index, 4);
        assert_eq!(result.found_peaks(), Some(&[50][..]));

        let batch = result.batch.unwrap();
        let expected = det.range_depths()[50];
        assert!((expected - 50.0 / 99.0).abs() < 1e-12);
        assert_eq!(batch.main_peak_history.len(), 1);
        assert_eq!(batch.main_peak_history[0].offset_s, 0.0);
        assert!((batch.main_peak_history[0].distance_m - expected).abs() < 1e-12);
        assert!(batch.minor_peaks_history.is_empty());
    }

    #[test]
    fn quiet_sweeps_produce_no_peaks() {
        for show_first in [false, true] {
            let config = ProcessingConfig {
                nbr_average: 2.0,
                show_first_above_threshold: show_first,
                ..Default::default()
            };
            let mut det = detector(10.0, 50, &config);
            det.process(&vec![300.0; 50]).unwrap();
            let batch = det.process(&vec![300.0; 50]).unwrap().batch.unwrap();
            assert!(batch.found_peaks.is_empty());
            assert_eq!(batch.first_above_threshold, None);
            assert!(batch.above_threshold_history.is_empty());
        }
    }

    #[test]
    fn constant_sweeps_average_exactly_and_reset() {
        let config = ProcessingConfig {
            nbr_average: 3.0,
            ..Default::default()
        };
        let mut det = detector(10.0, 10, &config);
        for _ in 0..3 {
            det.process(&vec![123.25; 10]).unwrap();
        }
        assert!(det
            .state()
            .last_mean_sweep()
            .iter()
            .all(|&v| (v - 123.25).abs() < 1e-9));
        assert_eq!(det.state().sweeps_since_mean(), 0);
        assert_eq!(det.state().sweep_index(), 3);
    }

    #[test]
    fn first_above_threshold_follows_the_flag() {
        let sweep = vec![1000.0; 20];
        for (show_first, expected) in [(false, None), (true, Some(0))] {
            let config = ProcessingConfig {
                nbr_average: 1.0,
                show_first_above_threshold: show_first,
                ..Default::default()
            };
            let mut det = detector(10.0, 20, &config);
            let batch = det.process(&sweep).unwrap().batch.unwrap();
            // A flat plateau has no rising edge.
            assert!(batch.found_peaks.is_empty());
            assert_eq!(batch.first_above_threshold, expected);
            assert_eq!(batch.above_threshold_history.len(), expected.map_or(0, |_| 1));
        }
    }

    #[test]
    fn ranked_peaks_split_into_main_and_minor_history() {
        let config = ProcessingConfig {
            nbr_average: 1.0,
            fixed_threshold: 100.0,
            peak_sorting_type: PeakSorting::Strongest,
            ..Default::default()
        };
        let mut det = detector(10.0, 100, &config);
        let mut sweep = bump(100, 20, &[200.0, 400.0, 200.0]);
        sweep[69..72].copy_from_slice(&[300.0, 900.0, 300.0]);

        let batch = det.process(&sweep).unwrap().batch.unwrap();
        assert_eq!(batch.found_peaks, vec![70, 20]);
        assert_eq!(batch.minor_peaks_history.len(), 1);
        assert!((batch.minor_peaks_history[0].distance_m - det.range_depths()[20]).abs() < 1e-12);

        let closest = ProcessingConfig {
            peak_sorting_type: PeakSorting::Closest,
            ..config
        };
        det.update_processing_config(closest).unwrap();
        let batch = det.process(&sweep).unwrap().batch.unwrap();
        assert_eq!(batch.found_peaks, vec![20, 70]);
        assert_eq!(batch.main_peak_history.len(), 2);
        assert!((batch.main_peak_history[0].offset_s + 0.1).abs() < 1e-12);
    }

    #[test]
    fn history_is_bounded_by_age() {
        let config = ProcessingConfig {
            nbr_average: 1.0,
            fixed_threshold: 100.0,
            history_length_s: 1.0,
            ..Default::default()
        };
        let mut det = detector(10.0, 30, &config);
        let sweep = bump(30, 15, &[200.0, 400.0, 200.0]);

        let mut last = None;
        for _ in 0..21 {
            last = det.process(&sweep).unwrap().batch;
        }
        let history = last.unwrap().main_peak_history;
        assert_eq!(history.len(), 11);
        assert!(history.iter().all(|p| p.offset_s <= 0.0 && p.offset_s >= -1.0));
    }

    #[test]
    fn cfar_detects_bump_over_noise_floor() {
        let config = ProcessingConfig {
            nbr_average: 1.0,
            threshold_type: ThresholdType::Cfar,
            cfar_guard_cm: 4.0,
            cfar_window_cm: 2.0,
            cfar_sensitivity: 0.5,
            ..Default::default()
        };
        let mut det = detector(10.0, 101, &config);
        let mut sweep = vec![100.0; 101];
        sweep[49..52].copy_from_slice(&[400.0, 600.0, 400.0]);

        let result = det.process(&sweep).unwrap();
        assert!(result.threshold[0].is_nan());
        assert!(result.threshold[100].is_nan());
        assert!((result.threshold[20] - 200.0).abs() < 1e-6);
        assert_eq!(result.found_peaks(), Some(&[50][..]));
    }

    #[test]
    fn recorded_threshold_fails_without_touching_state() {
        let config = ProcessingConfig {
            threshold_type: ThresholdType::Recorded,
            ..Default::default()
        };
        let mut det = detector(10.0, 10, &config);
        let err = det.process(&vec![1.0; 10]).unwrap_err();
        assert_eq!(err, DetectorError::UnsupportedThreshold(ThresholdType::Recorded));
        assert_eq!(det.state().sweep_index(), 0);
        assert_eq!(det.state().sweeps_since_mean(), 0);
        assert_eq!(det.metrics().snapshot().rejected, 1);
    }

    #[test]
    fn malformed_sweeps_are_rejected() {
        let mut det = detector(10.0, 10, &ProcessingConfig::default());
        assert!(matches!(
            det.process(&vec![1.0; 9]),
            Err(DetectorError::InvalidSweep(_))
        ));
        let mut sweep = vec![1.0; 10];
        sweep[3] = f64::NAN;
        assert!(matches!(det.process(&sweep), Err(DetectorError::InvalidSweep(_))));
        assert_eq!(det.state().sweep_index(), 0);
    }

    #[test]
    fn create_requires_update_rate_and_valid_config() {
        let mut no_rate = sensor(10.0, [0.0, 1.0]);
        no_rate.update_rate = None;
        let session = SessionInfo::for_sensor(&no_rate, 10);
        assert!(matches!(
            PeakDetector::create(&no_rate, &ProcessingConfig::default(), &session),
            Err(DetectorError::Config(_))
        ));

        let good = sensor(10.0, [0.0, 1.0]);
        let bad = ProcessingConfig {
            cfar_sensitivity: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            PeakDetector::create(&good, &bad, &session),
            Err(DetectorError::Config(_))
        ));
    }

    #[test]
    fn create_rejects_oversized_cfar_window() {
        let sensor = sensor(10.0, [0.0, 1.0]);
        let session = SessionInfo::for_sensor(&sensor, 101);
        let config = ProcessingConfig {
            threshold_type: ThresholdType::Cfar,
            cfar_window_cm: 1e13,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(matches!(
            PeakDetector::create(&sensor, &config, &session),
            Err(DetectorError::Config(_))
        ));
    }

    #[test]
    fn reconfiguration_keeps_partial_batch() {
        let mut det = detector(10.0, 10, &ProcessingConfig::default());
        det.process(&vec![10.0; 10]).unwrap();
        det.process(&vec![10.0; 10]).unwrap();

        let shorter = ProcessingConfig {
            nbr_average: 3.0,
            ..Default::default()
        };
        det.update_processing_config(shorter).unwrap();
        assert_eq!(det.state().sweeps_since_mean(), 2);
        assert!(det.process(&vec![10.0; 10]).unwrap().is_batch_complete());

        let invalid = ProcessingConfig {
            nbr_average: 0.0,
            ..Default::default()
        };
        assert!(det.update_processing_config(invalid).is_err());
        assert_eq!(det.config().nbr_average, 3.0);
    }

    #[test]
    fn metrics_can_be_shared_with_the_caller() {
        let shared = Arc::new(MetricsRecorder::new());
        let config = ProcessingConfig {
            nbr_average: 2.0,
            ..Default::default()
        };
        let mut det = detector(10.0, 10, &config).with_metrics(Arc::clone(&shared));
        for _ in 0..4 {
            det.process(&vec![0.0; 10]).unwrap();
        }
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.sweeps, 4);
        assert_eq!(snapshot.batches, 2);
        assert_eq!(snapshot.batches_with_peaks, 0);
    }
}
