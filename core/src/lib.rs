//! Streaming peak-detection core for envelope distance sensors.
//!
//! A [`PeakDetector`] consumes one range-amplitude sweep per call, averages
//! sweeps in batches, thresholds the mean, and reports ranked reflector
//! distances together with age-bounded detection histories.

pub mod config;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod session;
pub mod telemetry;

pub use config::{PeakSorting, ProcessingConfig, ThresholdType};
pub use prelude::{DetectorError, DetectorResult, PeakSet, SweepFrame, ThresholdCurve};
pub use processing::PeakDetector;
pub use session::{BatchOutcome, HistoryPoint, ProcessResult, SensorConfig, SessionInfo};
