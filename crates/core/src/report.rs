//! Plugin output: message body, performance data and the final line in
//! either plain Nagios format or Check_MK local-check format.

use std::fmt;

use crate::hardware::telemetry::DeviceTelemetry;
use crate::hardware::thresholds::{Evaluation, ThresholdConfig};
use crate::metric_names::{
    PERF_ASIC_TEMP, PERF_CPU_TEMP, PERF_LOAD1, PERF_LOAD15, PERF_LOAD5, PERF_MEM_USED,
    PERF_SIB_TEMP,
};
use crate::severity::Severity;

/// Output dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `message|perf perf ...`
    #[default]
    Plain,
    /// `<code> <name> <perf|perf|...> <SEV4> - message`
    CheckMk,
}

/// One performance-data entry: `'label'=value[uom];warn;crit;min;max`.
///
/// Empty fields are kept as empty positions, trailing ones included.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfDatum {
    pub label: &'static str,
    pub value: String,
    pub uom: &'static str,
    pub warning: Option<String>,
    pub critical: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl PerfDatum {
    fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
            uom: "",
            warning: None,
            critical: None,
            min: None,
            max: None,
        }
    }

    fn uom(mut self, uom: &'static str) -> Self {
        self.uom = uom;
        self
    }

    fn thresholds(mut self, warning: impl ToString, critical: impl ToString) -> Self {
        self.warning = Some(warning.to_string());
        self.critical = Some(critical.to_string());
        self
    }

    fn min(mut self, min: impl ToString) -> Self {
        self.min = Some(min.to_string());
        self
    }

    fn max(mut self, max: impl ToString) -> Self {
        self.max = Some(max.to_string());
        self
    }
}

impl fmt::Display for PerfDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        write!(
            f,
            "'{}'={}{};{};{};{};{}",
            self.label,
            self.value,
            self.uom,
            opt(&self.warning),
            opt(&self.critical),
            opt(&self.min),
            opt(&self.max),
        )
    }
}

/// Final result of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub severity: Severity,
    /// May span several lines.
    pub message: String,
    pub perf_data: Vec<PerfDatum>,
}

impl Report {
    /// An UNKNOWN result with no performance data.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Unknown,
            message: message.into(),
            perf_data: Vec::new(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.severity.exit_code()
    }

    /// Render the single plugin output line. `program` is the tool
    /// basename used by Check_MK mode.
    pub fn render(&self, mode: OutputMode, program: &str) -> String {
        match mode {
            OutputMode::Plain => {
                if self.perf_data.is_empty() {
                    self.message.clone()
                } else {
                    format!("{}|{}", self.message, join_perf(&self.perf_data, " "))
                }
            }
            OutputMode::CheckMk => {
                let perf = if self.perf_data.is_empty() {
                    "-".to_string()
                } else {
                    join_perf(&self.perf_data, "|")
                };
                format!(
                    "{} {} {} {} - {}",
                    self.exit_code(),
                    program,
                    perf,
                    self.severity.short_name(),
                    self.message,
                )
            }
        }
    }
}

fn join_perf(perf: &[PerfDatum], separator: &str) -> String {
    perf.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Build the report for an evaluated device.
pub fn build_report(
    telemetry: &DeviceTelemetry,
    thresholds: &ThresholdConfig,
    evaluation: &Evaluation,
) -> Report {
    Report {
        severity: evaluation.overall,
        message: render_message(telemetry, evaluation),
        perf_data: perf_data(telemetry, thresholds),
    }
}

/// Message body: module faults, memory, temperatures, tagged load line.
pub fn render_message(telemetry: &DeviceTelemetry, evaluation: &Evaluation) -> String {
    let modules = &telemetry.modules;
    let mut lines = Vec::with_capacity(5);

    if modules.failed.is_empty() {
        lines.push("[PASSED] All Module(s) OK".to_string());
    } else {
        lines.push(format!(
            "[FAILED] Found faulty Module(s): [{}]",
            join_ids(&modules.failed)
        ));
    }
    if !modules.missing.is_empty() {
        lines.push(format!(
            "[INFO] Found missing Module(s): [{}]",
            join_ids(&modules.missing)
        ));
    }

    lines.push(format!(
        "Memory used: {}%",
        telemetry.memory.percent_used()
    ));

    let temps = &telemetry.temperatures;
    lines.push(format!(
        "CPU:{} Asic:{} SIB:{}",
        temps.cpu_c, temps.asic_max_c, temps.sib_max_c
    ));

    let tag = if evaluation.load.is_problem() {
        "[FAILED]"
    } else {
        "[PASSED]"
    };
    let load = &telemetry.load;
    lines.push(format!(
        "{tag} - CPU Load: {},{},{}",
        load.load1, load.load5, load.load15
    ));

    lines.join("\n")
}

fn join_ids<'a>(ids: impl IntoIterator<Item = &'a String>) -> String {
    ids.into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Performance data for every metric, in a fixed order.
pub fn perf_data(telemetry: &DeviceTelemetry, thresholds: &ThresholdConfig) -> Vec<PerfDatum> {
    let memory = &telemetry.memory;
    let mem = &thresholds.memory_percent;

    let mut perf = vec![PerfDatum::new(PERF_MEM_USED, memory.used_mb)
        .uom("MB")
        .thresholds(
            percent_of_total_mb(memory.total_mb, mem.warning),
            percent_of_total_mb(memory.total_mb, mem.critical),
        )
        .min(0)
        .max(memory.total_mb)];

    let load = &thresholds.load;
    for ((label, value), i) in [PERF_LOAD1, PERF_LOAD5, PERF_LOAD15]
        .into_iter()
        .zip(telemetry.load.as_array())
        .zip(0..)
    {
        perf.push(
            PerfDatum::new(label, value)
                .thresholds(load.warning[i], load.critical[i])
                .min(0),
        );
    }

    let temp = &thresholds.temperature;
    for ((label, value), i) in [PERF_CPU_TEMP, PERF_ASIC_TEMP, PERF_SIB_TEMP]
        .into_iter()
        .zip(telemetry.temperatures.as_array())
        .zip(0..)
    {
        perf.push(PerfDatum::new(label, value).thresholds(temp.warning[i], temp.critical[i]));
    }

    perf
}

/// Smallest whole number of MB whose integer percentage reaches `percent`.
fn percent_of_total_mb(total_mb: u64, percent: u32) -> u64 {
    total_mb.saturating_mul(u64::from(percent)).div_ceil(100)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
