use crate::prelude::{DetectorError, DetectorResult};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Sensor-side settings the detector reads but never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Sweep rate in Hz; must be set before a detector can be created.
    pub update_rate: Option<f64>,
    /// Measured range `[start, end]` in meters.
    pub range_interval: [f64; 2],
    #[serde(default = "default_true")]
    pub noise_level_normalization: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            update_rate: Some(20.0),
            range_interval: [0.2, 1.0],
            noise_level_normalization: true,
        }
    }
}

/// Metadata negotiated when the measurement session was set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub data_length: usize,
    pub range_start_m: f64,
    pub range_length_m: f64,
}

impl SessionInfo {
    pub fn for_sensor(sensor: &SensorConfig, data_length: usize) -> Self {
        let [start, end] = sensor.range_interval;
        Self {
            data_length,
            range_start_m: start,
            range_length_m: end - start,
        }
    }

    /// Evenly spaced range depths, first and last sample included.
    pub fn range_depths(&self) -> DetectorResult<Vec<f64>> {
        if self.data_length < 2 {
            return Err(DetectorError::Config(format!(
                "data_length must be at least 2, got {}",
                self.data_length
            )));
        }
        if !(self.range_length_m.is_finite() && self.range_length_m > 0.0)
            || !self.range_start_m.is_finite()
        {
            return Err(DetectorError::Config(format!(
                "range of {} m starting at {} m is not usable",
                self.range_length_m, self.range_start_m
            )));
        }

        let step = self.range_length_m / (self.data_length - 1) as f64;
        Ok((0..self.data_length)
            .map(|i| self.range_start_m + step * i as f64)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_depths_span_interval_inclusively() {
        let sensor = SensorConfig {
            range_interval: [0.0, 1.0],
            ..Default::default()
        };
        let session = SessionInfo::for_sensor(&sensor, 101);
        let depths = session.range_depths().unwrap();
        assert_eq!(depths.len(), 101);
        assert_eq!(depths[0], 0.0);
        assert!((depths[100] - 1.0).abs() < 1e-12);
        assert!((depths[1] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn range_depths_reject_degenerate_sessions() {
        let short = SessionInfo {
            data_length: 1,
            range_start_m: 0.0,
            range_length_m: 1.0,
        };
        assert!(short.range_depths().is_err());

        let inverted = SessionInfo {
            data_length: 10,
            range_start_m: 1.0,
            range_length_m: -0.5,
        };
        assert!(inverted.range_depths().is_err());
    }

    #[test]
    fn normalization_defaults_on_when_omitted() {
        let sensor: SensorConfig =
            serde_json::from_str(r#"{"update_rate": 10.0, "range_interval": [0.1, 0.9]}"#).unwrap();
        assert!(sensor.noise_level_normalization);
        assert_eq!(sensor.update_rate, Some(10.0));
    }
}
