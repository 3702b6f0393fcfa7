#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use ibswitch_probe::check::{CMD_SHOW_MODULE, CMD_SHOW_TEMPERATURE, CMD_SHOW_VERSION};
use ibswitch_probe::client::{SwitchApi, TransportError};

/// In-memory switch answering from canned responses.
///
/// Commands without a response fail with an HTTP 503 transport error.
pub struct FakeSwitch {
    responses: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl FakeSwitch {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A switch with nominal readings on every query.
    pub fn healthy() -> Self {
        Self::new()
            .respond(CMD_SHOW_VERSION, show_version(50, 100, "0.37 / 0.29 / 0.20"))
            .respond(CMD_SHOW_TEMPERATURE, show_temperature_single(41.0, 33.0, 48.0))
            .respond(CMD_SHOW_MODULE, show_module(&[("MGMT", "ready"), ("FAN1", "ready")]))
    }

    pub fn respond(mut self, command: &str, response: Value) -> Self {
        self.responses.insert(command.to_string(), response);
        self
    }

    pub fn fail(mut self, command: &str) -> Self {
        self.responses.remove(command);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwitchApi for FakeSwitch {
    async fn execute(&self, command: &str) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(command.to_string());
        self.responses
            .get(command)
            .cloned()
            .ok_or_else(|| TransportError::ApiError {
                status: 503,
                body: "Service Unavailable".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// Response fixtures
// ---------------------------------------------------------------------------

pub fn show_version(used_mb: u64, total_mb: u64, load: &str) -> Value {
    json!({
        "status": "OK",
        "executed_command": "show version",
        "status_message": "",
        "data": {
            "Product name": "MLNX-OS",
            "Product release": "3.9.2400",
            "Uptime": "41d 3h 12m 5.120s",
            "CPU load averages": load,
            "System memory": format!(
                "{used_mb} MB used / {} MB free / {total_mb} MB total",
                total_mb - used_mb
            ),
            "Swap": "0 MB used / 0 MB free / 0 MB total"
        }
    })
}

/// Edge switch: one `MGMT` group.
pub fn show_temperature_single(cpu: f64, ports_amb: f64, sib: f64) -> Value {
    json!({
        "status": "OK",
        "data": {
            "Temperature per module": {
                "MGMT": [
                    { "Component": "CPU package Sensor", "CurTemp (Celsius)": cpu.to_string() },
                    { "Component": "Ports AMB temp", "CurTemp (Celsius)": ports_amb.to_string() },
                    { "Component": "SIB", "CurTemp (Celsius)": sib.to_string() }
                ]
            }
        }
    })
}

/// Director chassis: `MGMT1`/`MGMT2` plus spine and leaf groups.
pub fn show_temperature_redundant(cpu: f64, asics: &[f64], sibs: &[f64]) -> Value {
    let mut groups = serde_json::Map::new();
    groups.insert(
        "MGMT1".into(),
        json!([{ "Component": "CPU package Sensor", "CurTemp (Celsius)": cpu.to_string() }]),
    );
    groups.insert(
        "MGMT2".into(),
        json!([{ "Component": "CPU package Sensor", "CurTemp (Celsius)": "30" }]),
    );
    for (i, t) in sibs.iter().enumerate() {
        groups.insert(
            format!("S{:02}", i + 1),
            json!([{ "Component": format!("SIB{}", i + 1), "CurTemp (Celsius)": t.to_string() }]),
        );
    }
    for (i, t) in asics.iter().enumerate() {
        groups.insert(
            format!("L{:02}", i + 1),
            json!([{ "Component": "ASIC", "CurTemp (Celsius)": t.to_string() }]),
        );
    }

    json!({ "status": "OK", "data": { "Temperature per module": groups } })
}

/// Each module gets a stale `ready` snapshot followed by the given status.
pub fn show_module(modules: &[(&str, &str)]) -> Value {
    let data: serde_json::Map<String, Value> = modules
        .iter()
        .map(|(name, status)| {
            (
                name.to_string(),
                json!([{ "Status": "ready" }, { "Status": status }]),
            )
        })
        .collect();
    json!({ "status": "OK", "data": data })
}
