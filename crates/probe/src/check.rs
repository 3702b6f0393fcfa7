//! One complete health check: query, normalize, evaluate, render.

use serde_json::Value;

use ibswitch_core::hardware::telemetry::{normalize, response_data};
use ibswitch_core::hardware::thresholds::{evaluate, ThresholdConfig};
use ibswitch_core::report::{build_report, Report};

use crate::client::SwitchApi;
use crate::error::ProbeError;

pub const CMD_SHOW_VERSION: &str = "show version";
pub const CMD_SHOW_TEMPERATURE: &str = "show temperature";
pub const CMD_SHOW_MODULE: &str = "show module";

/// Run the three queries in sequence and evaluate the result.
///
/// The first failing query aborts the run; nothing is retried.
pub async fn run_check(
    api: &dyn SwitchApi,
    thresholds: &ThresholdConfig,
) -> Result<Report, ProbeError> {
    let general = query(api, CMD_SHOW_VERSION).await?;
    let temperature = query(api, CMD_SHOW_TEMPERATURE).await?;
    let modules = query(api, CMD_SHOW_MODULE).await?;

    let telemetry = normalize(
        response_data(&general, CMD_SHOW_VERSION).map_err(ProbeError::Data)?,
        response_data(&temperature, CMD_SHOW_TEMPERATURE).map_err(ProbeError::Data)?,
        response_data(&modules, CMD_SHOW_MODULE).map_err(ProbeError::Data)?,
    )
    .map_err(ProbeError::Data)?;

    let evaluation = evaluate(&telemetry, thresholds);
    tracing::info!(severity = %evaluation.overall, "Check complete");

    Ok(build_report(&telemetry, thresholds, &evaluation))
}

async fn query(api: &dyn SwitchApi, command: &str) -> Result<Value, ProbeError> {
    tracing::debug!(command, "Querying switch");
    api.execute(command).await.map_err(|source| {
        tracing::error!(command, error = %source, "Switch query failed");
        ProbeError::Transport {
            command: command.to_string(),
            source,
        }
    })
}
