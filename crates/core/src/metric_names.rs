//! Well-known labels: performance-data names emitted by the probe and the
//! field/component names found in switch JSON responses.

// ---------------------------------------------------------------------------
// Performance data labels
// ---------------------------------------------------------------------------

/// Used system memory in megabytes.
pub const PERF_MEM_USED: &str = "mem_used";

/// 1/5/15-minute CPU load averages.
pub const PERF_LOAD1: &str = "load1";
pub const PERF_LOAD5: &str = "load5";
pub const PERF_LOAD15: &str = "load15";

/// Temperatures in degrees Celsius.
pub const PERF_CPU_TEMP: &str = "cpu";
pub const PERF_ASIC_TEMP: &str = "asic";
pub const PERF_SIB_TEMP: &str = "sib";

// ---------------------------------------------------------------------------
// `show version` labels (matched by substring)
// ---------------------------------------------------------------------------

pub const LABEL_CPU_LOAD: &str = "CPU load";
pub const LABEL_SYSTEM_MEMORY: &str = "System memory";

// ---------------------------------------------------------------------------
// `show temperature` layout
// ---------------------------------------------------------------------------

pub const FIELD_TEMPERATURE_PER_MODULE: &str = "Temperature per module";
pub const FIELD_COMPONENT: &str = "Component";
pub const FIELD_CURRENT_TEMP: &str = "CurTemp (Celsius)";

/// Management module group names used to detect the chassis topology.
pub const GROUP_MGMT1: &str = "MGMT1";
pub const GROUP_MGMT2: &str = "MGMT2";
pub const GROUP_MGMT: &str = "MGMT";

/// Component name fragments (matched by substring).
pub const COMPONENT_CPU: &str = "CPU package Sensor";
pub const COMPONENT_SIB: &str = "SIB";
pub const COMPONENT_ASIC: &str = "ASIC";
/// Ambient port sensor reported instead of ASIC sensors on single-management switches.
pub const COMPONENT_PORTS_AMB: &str = "Ports AMB";

// ---------------------------------------------------------------------------
// `show module` layout
// ---------------------------------------------------------------------------

pub const FIELD_STATUS: &str = "Status";
pub const STATUS_NOT_PRESENT: &str = "not-present";
pub const STATUS_FAILED: &str = "failed";
