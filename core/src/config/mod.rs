pub mod params;
pub mod processing;

pub use params::{Bounds, ParamKind, ParamSpec, PROCESSING_PARAMS};
pub use processing::{PeakSorting, ProcessingConfig, ThresholdType};
