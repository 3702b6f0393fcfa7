/// Memory figures reported by the switch are whole megabytes.
pub type Megabytes = u64;

/// Temperatures are degrees Celsius.
pub type Celsius = f64;

/// Module identifiers as reported by `show module` (e.g. `MGMT1`, `FAN3`).
pub type ModuleId = String;
