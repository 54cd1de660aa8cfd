use crate::workflow::runner::Measurement;
use anyhow::Context;
use peakcore::telemetry::MetricsSnapshot;
use peakcore::BatchOutcome;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Summary of one simulator session, written as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub measurements: Vec<Measurement>,
    pub metrics: MetricsSnapshot,
    pub last_batch: Option<BatchOutcome>,
}

impl SessionReport {
    pub fn write<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let file = File::create(path_ref)
            .with_context(|| format!("creating report {}", path_ref.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing report {}", path_ref.display()))?;
        Ok(())
    }
}
