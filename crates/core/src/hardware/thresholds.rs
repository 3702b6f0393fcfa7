//! Threshold evaluation engine for switch telemetry.
//!
//! Pure logic. Each dimension is classified critical-first, then warning,
//! with inclusive (`>=`) comparisons; the overall verdict is the most
//! severe dimension.

use crate::error::CoreError;
use crate::hardware::telemetry::{DeviceTelemetry, ModuleHealth};
use crate::severity::{aggregate, Severity};
use crate::threshold_validation::{parse_threshold_list, validate_percentage};

pub const DEFAULT_MEMORY_WARNING: u32 = 85;
pub const DEFAULT_MEMORY_CRITICAL: u32 = 90;
pub const DEFAULT_LOAD_WARNING: &str = "4,3.5,3.40";
pub const DEFAULT_LOAD_CRITICAL: &str = "4.5,4,3.5";
/// CPU, ASIC, SIB.
pub const DEFAULT_TEMP_WARNING: &str = "60,55,82";
pub const DEFAULT_TEMP_CRITICAL: &str = "70,60,90";

/// A warning/critical pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold<T> {
    pub warning: T,
    pub critical: T,
}

/// All thresholds for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Percent of total memory in use.
    pub memory_percent: Threshold<u32>,
    /// 1, 5 and 15-minute load averages.
    pub load: Threshold<[f64; 3]>,
    /// CPU, ASIC and SIB temperatures.
    pub temperature: Threshold<[f64; 3]>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            memory_percent: Threshold {
                warning: DEFAULT_MEMORY_WARNING,
                critical: DEFAULT_MEMORY_CRITICAL,
            },
            load: Threshold {
                warning: [4.0, 3.5, 3.4],
                critical: [4.5, 4.0, 3.5],
            },
            temperature: Threshold {
                warning: [60.0, 55.0, 82.0],
                critical: [70.0, 60.0, 90.0],
            },
        }
    }
}

/// Raw threshold options as given on the command line.
#[derive(Debug, Clone)]
pub struct ThresholdArgs<'a> {
    pub memory_warning: u32,
    pub memory_critical: u32,
    pub load_warning: &'a str,
    pub load_critical: &'a str,
    pub temp_warning: &'a str,
    pub temp_critical: &'a str,
}

impl ThresholdConfig {
    /// Validate and convert raw options. Any malformed value is a
    /// `CoreError::Validation`.
    pub fn from_args(args: &ThresholdArgs<'_>) -> Result<Self, CoreError> {
        validate_percentage(args.memory_warning, "--memory-warning")?;
        validate_percentage(args.memory_critical, "--memory-critical")?;

        Ok(Self {
            memory_percent: Threshold {
                warning: args.memory_warning,
                critical: args.memory_critical,
            },
            load: Threshold {
                warning: parse_threshold_list(args.load_warning, "--load-warning")?,
                critical: parse_threshold_list(args.load_critical, "--load-critical")?,
            },
            temperature: Threshold {
                warning: parse_threshold_list(args.temp_warning, "--temp-warning")?,
                critical: parse_threshold_list(args.temp_critical, "--temp-critical")?,
            },
        })
    }
}

/// Per-dimension verdicts plus the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub memory: Severity,
    pub load: Severity,
    pub temperature: Severity,
    pub modules: Severity,
    pub overall: Severity,
}

/// Evaluate every dimension and aggregate.
pub fn evaluate(telemetry: &DeviceTelemetry, thresholds: &ThresholdConfig) -> Evaluation {
    let memory = evaluate_memory(telemetry.memory.percent_used(), &thresholds.memory_percent);
    let load = evaluate_triple(telemetry.load.as_array(), &thresholds.load);
    let temperature = evaluate_triple(telemetry.temperatures.as_array(), &thresholds.temperature);
    let modules = evaluate_modules(&telemetry.modules);

    let overall = aggregate([memory, load, temperature, modules]);

    tracing::debug!(
        %memory,
        %load,
        %temperature,
        %modules,
        %overall,
        "Evaluated thresholds",
    );

    Evaluation {
        memory,
        load,
        temperature,
        modules,
        overall,
    }
}

/// Classify a memory usage percentage.
pub fn evaluate_memory(percent_used: u64, threshold: &Threshold<u32>) -> Severity {
    if percent_used >= u64::from(threshold.critical) {
        Severity::Critical
    } else if percent_used >= u64::from(threshold.warning) {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

/// Classify three readings against positional thresholds. Any single
/// reading reaching a tier is enough.
pub fn evaluate_triple(values: [f64; 3], threshold: &Threshold<[f64; 3]>) -> Severity {
    let any_reaches = |limits: &[f64; 3]| values.iter().zip(limits).any(|(v, limit)| v >= limit);

    if any_reaches(&threshold.critical) {
        Severity::Critical
    } else if any_reaches(&threshold.warning) {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

/// Failed modules are critical. Missing modules do not affect severity.
pub fn evaluate_modules(health: &ModuleHealth) -> Severity {
    if health.failed.is_empty() {
        Severity::Ok
    } else {
        Severity::Critical
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
