pub mod averager;
pub mod detector;
pub mod history;
pub mod merge;
pub mod peaks;
pub mod ranking;
pub mod threshold;

pub use averager::Averager;
pub use detector::{DetectorState, PeakDetector};
pub use history::{HistoryBuffer, HistoryTracker};
pub use merge::PeakMerger;
pub use peaks::PeakFinder;
pub use ranking::PeakRanker;
pub use threshold::{CfarThreshold, Thresholder};
