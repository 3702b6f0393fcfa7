//! Canonical device telemetry and the normalizer that builds it from raw
//! switch responses.
//!
//! Pure logic: the caller fetches `show version`, `show temperature` and
//! `show module` and passes in each response's `data` document.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::metric_names::{
    COMPONENT_ASIC, COMPONENT_CPU, COMPONENT_PORTS_AMB, COMPONENT_SIB, FIELD_COMPONENT,
    FIELD_CURRENT_TEMP, FIELD_STATUS, FIELD_TEMPERATURE_PER_MODULE, GROUP_MGMT, GROUP_MGMT1,
    GROUP_MGMT2, LABEL_CPU_LOAD, LABEL_SYSTEM_MEMORY, STATUS_FAILED, STATUS_NOT_PRESENT,
};
use crate::types::{Celsius, Megabytes, ModuleId};

/// System memory figures from `show version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUsage {
    pub used_mb: Megabytes,
    pub free_mb: Megabytes,
    /// Always greater than zero. Both `used_mb` and `total_mb` fit in a
    /// `u64` after multiplying by 100.
    pub total_mb: Megabytes,
}

impl MemoryUsage {
    /// Used memory as a whole percentage of total (integer division).
    pub fn percent_used(&self) -> u64 {
        self.used_mb.saturating_mul(100) / self.total_mb
    }
}

/// 1/5/15-minute CPU load averages.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadAverages {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

impl LoadAverages {
    pub fn as_array(&self) -> [f64; 3] {
        [self.load1, self.load5, self.load15]
    }
}

/// Highest reading per sensor class.
#[derive(Debug, Clone, PartialEq)]
pub struct Temperatures {
    pub cpu_c: Celsius,
    pub asic_max_c: Celsius,
    pub sib_max_c: Celsius,
}

impl Temperatures {
    /// Readings in CPU, ASIC, SIB order (the order of temperature thresholds).
    pub fn as_array(&self) -> [Celsius; 3] {
        [self.cpu_c, self.asic_max_c, self.sib_max_c]
    }
}

/// Module inventory state from the latest status snapshot of each module.
///
/// A module may appear in both sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleHealth {
    pub missing: BTreeSet<ModuleId>,
    pub failed: BTreeSet<ModuleId>,
}

/// Everything the evaluator needs about one switch.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTelemetry {
    pub memory: MemoryUsage,
    pub load: LoadAverages,
    pub temperatures: Temperatures,
    pub modules: ModuleHealth,
}

/// Chassis layout of the `Temperature per module` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Redundant management modules (`MGMT1`/`MGMT2`), director-class chassis.
    /// SIB and ASIC sensors are spread over every module group.
    Redundant,
    /// A single `MGMT` group holding every sensor, edge switches.
    Single,
}

impl Topology {
    /// Pick the topology from the module group names.
    pub fn detect(groups: &Map<String, Value>) -> Result<Self, CoreError> {
        if groups.contains_key(GROUP_MGMT1) || groups.contains_key(GROUP_MGMT2) {
            Ok(Topology::Redundant)
        } else if groups.contains_key(GROUP_MGMT) {
            Ok(Topology::Single)
        } else {
            let names: Vec<&str> = groups.keys().map(String::as_str).collect();
            Err(CoreError::UnknownTopology(names.join(", ")))
        }
    }

    /// Extract the three temperature classes using this topology's rules.
    pub fn extract(self, groups: &Map<String, Value>) -> Result<Temperatures, CoreError> {
        match self {
            Topology::Redundant => extract_redundant(groups),
            Topology::Single => extract_single(groups),
        }
    }
}

/// Build a [`DeviceTelemetry`] from the `data` documents of the three queries.
pub fn normalize(
    general: &Value,
    temperature: &Value,
    modules: &Value,
) -> Result<DeviceTelemetry, CoreError> {
    let (memory, load) = parse_general_status(general)?;
    let temperatures = parse_temperatures(temperature)?;
    let modules = parse_modules(modules)?;

    tracing::debug!(
        memory_used_mb = memory.used_mb,
        memory_total_mb = memory.total_mb,
        load1 = load.load1,
        cpu_c = temperatures.cpu_c,
        asic_max_c = temperatures.asic_max_c,
        sib_max_c = temperatures.sib_max_c,
        failed_modules = modules.failed.len(),
        missing_modules = modules.missing.len(),
        "Normalized device telemetry",
    );

    Ok(DeviceTelemetry {
        memory,
        load,
        temperatures,
        modules,
    })
}

/// Return the `data` member of a switch JSON response.
pub fn response_data<'a>(response: &'a Value, command: &str) -> Result<&'a Value, CoreError> {
    response
        .get("data")
        .ok_or_else(|| CoreError::MissingField(format!("'data' in '{command}' response")))
}

// ---------------------------------------------------------------------------
// show version
// ---------------------------------------------------------------------------

/// Extract memory usage and load averages from the `show version` document.
pub fn parse_general_status(data: &Value) -> Result<(MemoryUsage, LoadAverages), CoreError> {
    let entries = as_object(data, "show version")?;

    let mut memory = None;
    let mut load = None;
    for (label, value) in entries {
        if label.contains(LABEL_CPU_LOAD) {
            load = Some(parse_load_averages(as_str(value, label)?)?);
        }
        if label.contains(LABEL_SYSTEM_MEMORY) {
            memory = Some(parse_memory(as_str(value, label)?)?);
        }
    }

    let memory = memory.ok_or_else(|| CoreError::MissingField(LABEL_SYSTEM_MEMORY.into()))?;
    let load = load.ok_or_else(|| CoreError::MissingField(LABEL_CPU_LOAD.into()))?;
    Ok((memory, load))
}

/// Parse `"<n>MB used / <n>MB free / <n>MB total"`.
pub fn parse_memory(raw: &str) -> Result<MemoryUsage, CoreError> {
    let bad = || unexpected(LABEL_SYSTEM_MEMORY, raw);

    let parts: Vec<&str> = raw.split('/').collect();
    let [used, free, total] = parts.as_slice() else {
        return Err(bad());
    };

    let used_mb = parse_megabytes(used, "used").ok_or_else(bad)?;
    let free_mb = parse_megabytes(free, "free").ok_or_else(bad)?;
    let total_mb = parse_megabytes(total, "total").ok_or_else(bad)?;
    let fits_percent = |mb: Megabytes| mb.checked_mul(100).is_some();
    if total_mb == 0 || !fits_percent(used_mb) || !fits_percent(total_mb) {
        return Err(bad());
    }

    Ok(MemoryUsage {
        used_mb,
        free_mb,
        total_mb,
    })
}

/// Strip whitespace and the `MB <kind>` suffix, leaving the number.
fn parse_megabytes(segment: &str, kind: &str) -> Option<Megabytes> {
    let compact: String = segment.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .strip_suffix(kind)?
        .strip_suffix("MB")?
        .parse()
        .ok()
}

/// Parse `"<l1> / <l5> / <l15>"`.
pub fn parse_load_averages(raw: &str) -> Result<LoadAverages, CoreError> {
    let parts: Vec<&str> = raw.split('/').collect();
    let [l1, l5, l15] = parts.as_slice() else {
        return Err(unexpected(LABEL_CPU_LOAD, raw));
    };

    let parse = |s: &str| -> Result<f64, CoreError> {
        match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(unexpected(LABEL_CPU_LOAD, raw)),
        }
    };

    Ok(LoadAverages {
        load1: parse(*l1)?,
        load5: parse(*l5)?,
        load15: parse(*l15)?,
    })
}

// ---------------------------------------------------------------------------
// show temperature
// ---------------------------------------------------------------------------

/// Extract the CPU/ASIC/SIB temperatures from the `show temperature` document.
pub fn parse_temperatures(data: &Value) -> Result<Temperatures, CoreError> {
    let groups = data
        .get(FIELD_TEMPERATURE_PER_MODULE)
        .ok_or_else(|| CoreError::MissingField(FIELD_TEMPERATURE_PER_MODULE.into()))?;
    let groups = as_object(groups, FIELD_TEMPERATURE_PER_MODULE)?;

    let topology = Topology::detect(groups)?;
    tracing::debug!(?topology, groups = groups.len(), "Detected temperature topology");
    topology.extract(groups)
}

/// One sensor row; the temperature is parsed only when the row is used.
struct SensorRow<'a> {
    component: &'a str,
    reading: &'a Value,
}

impl SensorRow<'_> {
    fn celsius(&self) -> Result<Celsius, CoreError> {
        let parsed = match self.reading {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| unexpected(self.component, &self.reading.to_string()))
    }
}

fn sensor_rows<'a>(group: &'a Value, group_name: &str) -> Result<Vec<SensorRow<'a>>, CoreError> {
    let rows = group
        .as_array()
        .ok_or_else(|| unexpected(group_name, &group.to_string()))?;

    rows.iter()
        .map(|row| {
            let component = row
                .get(FIELD_COMPONENT)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    CoreError::MissingField(format!("{FIELD_COMPONENT} in {group_name}"))
                })?;
            let reading = row.get(FIELD_CURRENT_TEMP).ok_or_else(|| {
                CoreError::MissingField(format!("{FIELD_CURRENT_TEMP} for {component}"))
            })?;
            Ok(SensorRow { component, reading })
        })
        .collect()
}

fn extract_redundant(groups: &Map<String, Value>) -> Result<Temperatures, CoreError> {
    let mut cpu = None;
    for name in [GROUP_MGMT1, GROUP_MGMT2] {
        let Some(group) = groups.get(name) else {
            continue;
        };
        if let Some(row) = sensor_rows(group, name)?
            .into_iter()
            .find(|row| row.component.contains(COMPONENT_CPU))
        {
            cpu = Some(row.celsius()?);
            break;
        }
    }

    let mut sib_max: Option<Celsius> = None;
    let mut asic_max: Option<Celsius> = None;
    for (name, group) in groups {
        for row in sensor_rows(group, name)? {
            if row.component.contains(COMPONENT_SIB) {
                let value = row.celsius()?;
                sib_max = Some(sib_max.map_or(value, |m| m.max(value)));
            }
            if row.component.contains(COMPONENT_ASIC) {
                let value = row.celsius()?;
                asic_max = Some(asic_max.map_or(value, |m| m.max(value)));
            }
        }
    }

    Ok(Temperatures {
        cpu_c: cpu.ok_or_else(|| CoreError::MissingField(COMPONENT_CPU.into()))?,
        asic_max_c: asic_max.ok_or_else(|| CoreError::MissingField(COMPONENT_ASIC.into()))?,
        sib_max_c: sib_max.ok_or_else(|| CoreError::MissingField(COMPONENT_SIB.into()))?,
    })
}

fn extract_single(groups: &Map<String, Value>) -> Result<Temperatures, CoreError> {
    let group = groups
        .get(GROUP_MGMT)
        .ok_or_else(|| CoreError::MissingField(GROUP_MGMT.into()))?;
    let rows = sensor_rows(group, GROUP_MGMT)?;

    let reading = |fragment: &str| -> Result<Celsius, CoreError> {
        rows.iter()
            .find(|row| row.component.contains(fragment))
            .ok_or_else(|| CoreError::MissingField(format!("{fragment} in {GROUP_MGMT}")))?
            .celsius()
    };

    Ok(Temperatures {
        cpu_c: reading(COMPONENT_CPU)?,
        asic_max_c: reading(COMPONENT_PORTS_AMB)?,
        sib_max_c: reading(COMPONENT_SIB)?,
    })
}

// ---------------------------------------------------------------------------
// show module
// ---------------------------------------------------------------------------

/// Classify modules by the status of their most recent snapshot.
pub fn parse_modules(data: &Value) -> Result<ModuleHealth, CoreError> {
    let inventory = as_object(data, "show module")?;

    let mut health = ModuleHealth::default();
    for (module, snapshots) in inventory {
        let latest = snapshots
            .as_array()
            .and_then(|s| s.last())
            .ok_or_else(|| CoreError::MissingField(format!("status snapshot for {module}")))?;
        let status = latest
            .get(FIELD_STATUS)
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::MissingField(format!("{FIELD_STATUS} for {module}")))?;

        if status.contains(STATUS_NOT_PRESENT) {
            health.missing.insert(module.clone());
        }
        if status.contains(STATUS_FAILED) {
            health.failed.insert(module.clone());
        }
    }

    Ok(health)
}

// ---- private helpers ----

fn unexpected(field: &str, value: &str) -> CoreError {
    CoreError::UnexpectedFormat {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>, CoreError> {
    value
        .as_object()
        .ok_or_else(|| unexpected(field, &value.to_string()))
}

fn as_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, CoreError> {
    value
        .as_str()
        .ok_or_else(|| unexpected(field, &value.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
