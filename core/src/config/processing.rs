use crate::config::params::{self, ParamKind, PROCESSING_PARAMS};
use crate::prelude::{DetectorError, DetectorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy used to derive the per-sample decision threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ThresholdType {
    Fixed,
    /// Declared by sensor tooling but has no computation in this core.
    Recorded,
    #[serde(rename = "CFAR")]
    Cfar,
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThresholdType::Fixed => "Fixed",
            ThresholdType::Recorded => "Recorded",
            ThresholdType::Cfar => "CFAR",
        };
        f.write_str(label)
    }
}

impl FromStr for ThresholdType {
    type Err = DetectorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(ThresholdType::Fixed),
            "recorded" => Ok(ThresholdType::Recorded),
            "cfar" => Ok(ThresholdType::Cfar),
            other => Err(DetectorError::Config(format!("unknown threshold type `{}`", other))),
        }
    }
}

/// Priority metric used to order surviving peaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeakSorting {
    Closest,
    Strongest,
    StrongestReflector,
    StrongestFlatReflector,
}

impl PeakSorting {
    /// Human-facing label used by sensor tooling.
    pub fn label(&self) -> &'static str {
        match self {
            PeakSorting::Closest => "Closest signal",
            PeakSorting::Strongest => "Strongest signal",
            PeakSorting::StrongestReflector => "Strongest reflector",
            PeakSorting::StrongestFlatReflector => "Strongest flat reflector",
        }
    }
}

impl FromStr for PeakSorting {
    type Err = DetectorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "closest" | "closestsignal" => Ok(PeakSorting::Closest),
            "strongest" | "strongestsignal" => Ok(PeakSorting::Strongest),
            "strongestreflector" => Ok(PeakSorting::StrongestReflector),
            "strongestflatreflector" => Ok(PeakSorting::StrongestFlatReflector),
            _ => Err(DetectorError::UnknownSortStrategy(value.to_string())),
        }
    }
}

/// Numeric and strategy parameters of the peak detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Sweeps per averaging batch; fractional values act like their ceiling.
    pub nbr_average: f64,
    pub threshold_type: ThresholdType,
    pub fixed_threshold: f64,
    pub cfar_guard_cm: f64,
    pub cfar_window_cm: f64,
    /// Only use closer distances for the CFAR noise estimate.
    pub cfar_one_sided: bool,
    pub cfar_sensitivity: f64,
    pub peak_sorting_type: PeakSorting,
    pub history_length_s: f64,
    pub show_first_above_threshold: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            nbr_average: 5.0,
            threshold_type: ThresholdType::Fixed,
            fixed_threshold: 800.0,
            cfar_guard_cm: 12.0,
            cfar_window_cm: 3.0,
            cfar_one_sided: false,
            cfar_sensitivity: 0.5,
            peak_sorting_type: PeakSorting::Strongest,
            history_length_s: 10.0,
            show_first_above_threshold: false,
        }
    }
}

impl ProcessingConfig {
    /// Checks every numeric field against the parameter table limits.
    pub fn validate(&self) -> DetectorResult<()> {
        for param in PROCESSING_PARAMS {
            if let ParamKind::Float { bounds, get, .. } = &param.kind {
                bounds.check(param.name, get(self))?;
            }
        }
        Ok(())
    }

    /// Builds a config from `base` with the external key/value overrides applied.
    ///
    /// Unknown keys, malformed values and out-of-range values are rejected;
    /// `base` itself is never modified.
    pub fn from_params(
        base: &ProcessingConfig,
        overrides: &serde_json::Map<String, serde_json::Value>,
    ) -> DetectorResult<ProcessingConfig> {
        let mut config = base.clone();
        for (key, value) in overrides {
            let param = params::lookup(key)
                .ok_or_else(|| DetectorError::Config(format!("unknown parameter `{}`", key)))?;
            param.apply(&mut config, value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Number of sweeps after which a batch closes.
    pub fn batch_size(&self) -> usize {
        self.nbr_average.ceil().max(1.0) as usize
    }
}
