//! `check_ib_switch` -- Nagios/Icinga/Check_MK plugin for InfiniBand switches.
//!
//! Queries the switch JSON API for memory, load, temperature and module
//! status, compares them against thresholds and prints one plugin line.
//! The exit code is the verdict: 0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN.
//!
//! # Environment variables
//!
//! | Variable             | Description                                |
//! |----------------------|--------------------------------------------|
//! | `IB_SWITCH_HOST`     | Fallback for `--host`                      |
//! | `IB_SWITCH_PASSWORD` | Fallback for `--password`                  |
//! | `RUST_LOG`           | Log filter when `--verbose` is not given   |

use std::path::Path;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ibswitch_core::report::{OutputMode, Report};
use ibswitch_probe::check::run_check;
use ibswitch_probe::client::SwitchClient;
use ibswitch_probe::config::{checkmk_requested, output_mode, Cli, ProbeConfig};
use ibswitch_probe::error::ProbeError;
use ibswitch_probe::supervisor::supervise;

const PROGRAM_NAME: &str = "check_ib_switch";

/// Log timestamps, e.g. `20240426 13:05:59`.
const LOG_TIME_FORMAT: &str = "%Y%m%d %H:%M:%S";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let program = program_name();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print().ok();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let checkmk = checkmk_requested(std::env::args().skip(1));
            let message = e.to_string();
            let first_line = message.lines().next().unwrap_or("invalid arguments");
            return finish(&Report::unknown(first_line), output_mode(checkmk), &program);
        }
    };

    init_tracing(cli.verbose);

    let mode = output_mode(cli.checkmk);
    let config = match ProbeConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return finish(&e.into_report(), mode, &program);
        }
    };

    tracing::info!(
        host = %config.connection.host,
        user = %config.connection.user,
        timeout_secs = config.timeout.map(|t| t.as_secs()),
        "Starting switch health check",
    );

    let client = match SwitchClient::new(&config.connection) {
        Ok(client) => client,
        Err(e) => return finish(&ProbeError::ClientSetup(e).into_report(), mode, &program),
    };

    let report = supervise(run_check(&client, &config.thresholds), config.timeout).await;
    finish(&report, config.output_mode, &program)
}

/// Print the plugin line and turn the severity into the exit code.
fn finish(report: &Report, mode: OutputMode, program: &str) -> ExitCode {
    println!("{}", report.render(mode, program));
    ExitCode::from(report.exit_code())
}

/// Basename of the executable as invoked, used in Check_MK output.
fn program_name() -> String {
    std::env::args()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| PROGRAM_NAME.to_string())
}

/// Logs go to stderr so stdout carries only the plugin line.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("ibswitch_probe=debug,ibswitch_core=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "off".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string())),
        )
        .init();
}
