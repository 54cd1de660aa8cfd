use crate::generator::profile::SweepGenerator;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use peakcore::telemetry::{MetricsRecorder, MetricsSnapshot};
use peakcore::{BatchOutcome, PeakDetector, ProcessResult};
use serde::Serialize;
use std::sync::Arc;

/// Top-ranked distance reported for one closed batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub sweep_index: u64,
    pub distance_cm: f64,
    pub peak_count: usize,
}

/// Drives one detector session with synthetic sweeps.
pub struct Runner {
    detector: PeakDetector,
    generator: SweepGenerator,
    metrics: Arc<MetricsRecorder>,
    sweeps_per_measurement: usize,
    last_result: Option<ProcessResult>,
    last_batch: Option<BatchOutcome>,
}

impl Runner {
    pub fn new(config: &WorkflowConfig) -> anyhow::Result<Self> {
        let processing = config.processing_config()?;
        let metrics = Arc::new(MetricsRecorder::new());
        let detector = PeakDetector::create(&config.sensor, &processing, &config.session_info())
            .context("creating peak detector")?
            .with_metrics(Arc::clone(&metrics));
        let generator = SweepGenerator::new(
            &config.generator,
            detector.range_depths().to_vec(),
            detector.update_rate(),
        )
        .context("creating sweep generator")?;

        Ok(Self {
            sweeps_per_measurement: processing.batch_size(),
            detector,
            generator,
            metrics,
            last_result: None,
            last_batch: None,
        })
    }

    /// Feeds one sweep; yields a measurement when a batch produced peaks.
    pub fn step(&mut self) -> anyhow::Result<Option<Measurement>> {
        let sweep = self.generator.next_sweep();
        let result = self
            .detector
            .process(&sweep)
            .with_context(|| format!("processing sweep {}", self.generator.produced()))?;

        let measurement = result.found_peaks().and_then(|peaks| {
            peaks.first().map(|&idx| Measurement {
                sweep_index: result.sweep_index,
                distance_cm: self.detector.range_depths()[idx] * 100.0,
                peak_count: peaks.len(),
            })
        });
        if let Some(batch) = &result.batch {
            self.last_batch = Some(batch.clone());
        }
        self.last_result = Some(result);
        Ok(measurement)
    }

    /// Pulls one batch worth of sweeps and collects what they reported.
    pub fn measure(&mut self) -> anyhow::Result<Vec<Measurement>> {
        let mut measurements = Vec::new();
        for _ in 0..self.sweeps_per_measurement {
            if let Some(measurement) = self.step()? {
                measurements.push(measurement);
            }
        }
        Ok(measurements)
    }

    pub fn sweeps_per_measurement(&self) -> usize {
        self.sweeps_per_measurement
    }

    pub fn update_rate(&self) -> f64 {
        self.detector.update_rate()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn last_result(&self) -> Option<&ProcessResult> {
        self.last_result.as_ref()
    }

    pub fn last_batch(&self) -> Option<&BatchOutcome> {
        self.last_batch.as_ref()
    }
}
