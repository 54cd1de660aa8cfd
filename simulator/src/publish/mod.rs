pub mod line;
pub mod report;
