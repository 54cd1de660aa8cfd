pub mod result;
pub mod sensor;

pub use result::{BatchOutcome, HistoryPoint, ProcessResult};
pub use sensor::{SensorConfig, SessionInfo};
