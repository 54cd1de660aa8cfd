//! Declarative table mapping external parameter names to typed setters.

use crate::config::processing::{PeakSorting, ProcessingConfig, ThresholdType};
use crate::prelude::{DetectorError, DetectorResult};
use serde_json::Value;

/// Legal range for a numeric parameter. NaN and infinities never pass.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: f64,
    pub min_inclusive: bool,
    pub max: Option<f64>,
}

impl Bounds {
    pub const fn at_least(min: f64) -> Self {
        Self {
            min,
            min_inclusive: true,
            max: None,
        }
    }

    pub const fn above(min: f64) -> Self {
        Self {
            min,
            min_inclusive: false,
            max: None,
        }
    }

    pub const fn up_to(self, max: f64) -> Self {
        Self {
            min: self.min,
            min_inclusive: self.min_inclusive,
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let lower_ok = if self.min_inclusive {
            value >= self.min
        } else {
            value > self.min
        };
        lower_ok && self.max.map_or(true, |max| value <= max)
    }

    pub fn check(&self, name: &str, value: f64) -> DetectorResult<()> {
        if self.contains(value) {
            return Ok(());
        }
        let lower = if self.min_inclusive { "[" } else { "(" };
        let upper = match self.max {
            Some(max) => format!("{}]", max),
            None => "inf)".to_string(),
        };
        Err(DetectorError::Config(format!(
            "`{}` = {} outside {}{}, {}",
            name, value, lower, self.min, upper
        )))
    }
}

/// How a parameter is parsed and stored.
pub enum ParamKind {
    Float {
        bounds: Bounds,
        get: fn(&ProcessingConfig) -> f64,
        set: fn(&mut ProcessingConfig, f64),
    },
    Flag(fn(&mut ProcessingConfig, bool)),
    Threshold,
    Sorting,
}

pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

pub const PROCESSING_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "nbr_average",
        kind: ParamKind::Float {
            bounds: Bounds::at_least(1.0).up_to(100.0),
            get: |c| c.nbr_average,
            set: |c, v| c.nbr_average = v,
        },
    },
    ParamSpec {
        name: "threshold_type",
        kind: ParamKind::Threshold,
    },
    ParamSpec {
        name: "fixed_threshold",
        kind: ParamKind::Float {
            bounds: Bounds::above(0.0).up_to(20000.0),
            get: |c| c.fixed_threshold,
            set: |c, v| c.fixed_threshold = v,
        },
    },
    ParamSpec {
        name: "cfar_guard_cm",
        kind: ParamKind::Float {
            bounds: Bounds::above(0.0).up_to(20.0),
            get: |c| c.cfar_guard_cm,
            set: |c, v| c.cfar_guard_cm = v,
        },
    },
    ParamSpec {
        name: "cfar_window_cm",
        kind: ParamKind::Float {
            bounds: Bounds::above(0.0).up_to(20.0),
            get: |c| c.cfar_window_cm,
            set: |c, v| c.cfar_window_cm = v,
        },
    },
    ParamSpec {
        name: "cfar_one_sided",
        kind: ParamKind::Flag(|c, v| c.cfar_one_sided = v),
    },
    ParamSpec {
        name: "cfar_sensitivity",
        kind: ParamKind::Float {
            bounds: Bounds::above(0.0).up_to(1.0),
            get: |c| c.cfar_sensitivity,
            set: |c, v| c.cfar_sensitivity = v,
        },
    },
    ParamSpec {
        name: "peak_sorting_type",
        kind: ParamKind::Sorting,
    },
    ParamSpec {
        name: "history_length_s",
        kind: ParamKind::Float {
            bounds: Bounds::at_least(0.0).up_to(1000.0),
            get: |c| c.history_length_s,
            set: |c, v| c.history_length_s = v,
        },
    },
    ParamSpec {
        name: "show_first_above_threshold",
        kind: ParamKind::Flag(|c, v| c.show_first_above_threshold = v),
    },
];

pub fn lookup(name: &str) -> Option<&'static ParamSpec> {
    PROCESSING_PARAMS.iter().find(|param| param.name == name)
}

impl ParamSpec {
    /// Parses `value` and stores it into `config`, checking numeric bounds.
    pub fn apply(&self, config: &mut ProcessingConfig, value: &Value) -> DetectorResult<()> {
        match &self.kind {
            ParamKind::Float { bounds, set, .. } => {
                let number = parse_number(self.name, value)?;
                bounds.check(self.name, number)?;
                set(config, number);
            }
            ParamKind::Flag(set) => set(config, parse_flag(self.name, value)?),
            ParamKind::Threshold => {
                config.threshold_type = parse_text(self.name, value)?.parse::<ThresholdType>()?;
            }
            ParamKind::Sorting => {
                config.peak_sorting_type = parse_text(self.name, value)?.parse::<PeakSorting>()?;
            }
        }
        Ok(())
    }
}

fn malformed(name: &str, value: &Value) -> DetectorError {
    DetectorError::Config(format!("`{}` has malformed value {}", name, value))
}

fn parse_number(name: &str, value: &Value) -> DetectorResult<f64> {
    match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| malformed(name, value)),
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| malformed(name, value)),
        _ => Err(malformed(name, value)),
    }
}

fn parse_flag(name: &str, value: &Value) -> DetectorResult<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(malformed(name, value)),
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(malformed(name, value)),
        },
        _ => Err(malformed(name, value)),
    }
}

fn parse_text<'a>(name: &str, value: &'a Value) -> DetectorResult<&'a str> {
    value.as_str().ok_or_else(|| malformed(name, value))
}
