use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use peakcore::{ProcessingConfig, SensorConfig, SessionInfo};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_data_length() -> usize {
    200
}

fn default_measurements() -> usize {
    20
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default = "default_data_length")]
    pub data_length: usize,
    /// Processing parameters by external name; see `peakcore::config::PROCESSING_PARAMS`.
    #[serde(default)]
    pub processing: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default = "default_measurements")]
    pub measurements: usize,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(update_rate: f64, data_length: usize) -> Self {
        Self {
            sensor: SensorConfig {
                update_rate: Some(update_rate),
                ..Default::default()
            },
            data_length,
            processing: serde_json::Map::new(),
            generator: GeneratorConfig::default(),
            measurements: default_measurements(),
        }
    }

    pub fn processing_config(&self) -> anyhow::Result<ProcessingConfig> {
        ProcessingConfig::from_params(&ProcessingConfig::default(), &self.processing)
            .context("applying processing parameters")
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo::for_sensor(&self.sensor, self.data_length)
    }
}
