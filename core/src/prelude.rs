use crate::config::ThresholdType;

/// One amplitude sample per range depth, as delivered by the sensor.
pub type SweepFrame = Vec<f64>;

/// Per-sample decision threshold; `NaN` where the threshold is undefined.
pub type ThresholdCurve = Vec<f64>;

/// Sample indices into the mean sweep, highest priority first.
pub type PeakSet = Vec<usize>;

/// Common error type for detector configuration and processing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("unsupported threshold type: {0}")]
    UnsupportedThreshold(ThresholdType),
    #[error("unknown peak sorting strategy: {0}")]
    UnknownSortStrategy(String),
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
}

pub type DetectorResult<T> = Result<T, DetectorError>;
