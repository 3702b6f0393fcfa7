use std::time::Duration;

use clap::{CommandFactory, Parser};

use ibswitch_core::hardware::thresholds::{
    ThresholdArgs, ThresholdConfig, DEFAULT_LOAD_CRITICAL, DEFAULT_LOAD_WARNING,
    DEFAULT_MEMORY_CRITICAL, DEFAULT_MEMORY_WARNING, DEFAULT_TEMP_CRITICAL, DEFAULT_TEMP_WARNING,
};
use ibswitch_core::report::OutputMode;

use crate::error::ProbeError;

/// Default watchdog deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Health check for Mellanox/NVIDIA InfiniBand switches via the JSON API.
#[derive(Debug, Clone, Parser)]
#[command(name = "check_ib_switch", version, about, long_about = None)]
pub struct Cli {
    /// Switch hostname or address
    #[arg(short = 'H', long, env = "IB_SWITCH_HOST")]
    pub host: Option<String>,

    /// API user
    #[arg(short, long, default_value = "admin")]
    pub user: String,

    /// API password
    #[arg(
        short,
        long,
        env = "IB_SWITCH_PASSWORD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// Memory usage warning threshold (percent)
    #[arg(long, default_value_t = DEFAULT_MEMORY_WARNING)]
    pub memory_warning: u32,

    /// Memory usage critical threshold (percent)
    #[arg(long, default_value_t = DEFAULT_MEMORY_CRITICAL)]
    pub memory_critical: u32,

    /// Load warning thresholds: 1min,5min,15min
    #[arg(long, default_value = DEFAULT_LOAD_WARNING)]
    pub load_warning: String,

    /// Load critical thresholds: 1min,5min,15min
    #[arg(long, default_value = DEFAULT_LOAD_CRITICAL)]
    pub load_critical: String,

    /// Temperature warning thresholds: CPU,ASIC,SIB
    #[arg(long, default_value = DEFAULT_TEMP_WARNING)]
    pub temp_warning: String,

    /// Temperature critical thresholds: CPU,ASIC,SIB
    #[arg(long, default_value = DEFAULT_TEMP_CRITICAL)]
    pub temp_critical: String,

    /// Overall deadline in seconds (0 disables it)
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Timestamped diagnostic logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Check_MK local check output format
    #[arg(short = 'm', long = "checkmk")]
    pub checkmk: bool,

    /// Verify the switch TLS certificate
    #[arg(long)]
    pub verify_tls: bool,
}

/// How to reach the switch.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub verify_tls: bool,
    /// Per-request HTTP timeout; `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub connection: ConnectionConfig,
    pub thresholds: ThresholdConfig,
    /// Watchdog deadline; `None` when disabled.
    pub timeout: Option<Duration>,
    pub output_mode: OutputMode,
}

impl ProbeConfig {
    /// Validate parsed arguments. Fails before any network activity.
    pub fn from_cli(cli: &Cli) -> Result<Self, ProbeError> {
        let host = cli
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ProbeError::MissingHost)?;

        let thresholds = ThresholdConfig::from_args(&ThresholdArgs {
            memory_warning: cli.memory_warning,
            memory_critical: cli.memory_critical,
            load_warning: &cli.load_warning,
            load_critical: &cli.load_critical,
            temp_warning: &cli.temp_warning,
            temp_critical: &cli.temp_critical,
        })
        .map_err(ProbeError::Config)?;

        let timeout = (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout));

        Ok(Self {
            connection: ConnectionConfig {
                host: host.to_string(),
                user: cli.user.clone(),
                password: cli.password.clone(),
                verify_tls: cli.verify_tls,
                request_timeout: timeout,
            },
            thresholds,
            timeout,
            output_mode: output_mode(cli.checkmk),
        })
    }
}

pub fn output_mode(checkmk: bool) -> OutputMode {
    if checkmk {
        OutputMode::CheckMk
    } else {
        OutputMode::Plain
    }
}

/// Whether raw arguments that failed to parse still ask for Check_MK
/// output. Understands bundled short flags (`-vm`) and skips option values.
pub fn checkmk_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut command = Cli::command();
    command.build();
    let short_takes_value = |flag: char| {
        command
            .get_arguments()
            .any(|a| a.get_short() == Some(flag) && a.get_action().takes_values())
    };
    let long_takes_value = |name: &str| {
        command
            .get_arguments()
            .any(|a| a.get_long() == Some(name) && a.get_action().takes_values())
    };

    let mut skip_value = false;
    for arg in args {
        let arg = arg.as_ref();
        if std::mem::take(&mut skip_value) {
            continue;
        }
        if arg == "--" {
            break;
        }

        if let Some(name) = arg.strip_prefix("--") {
            if name == "checkmk" {
                return true;
            }
            skip_value = !name.contains('=') && long_takes_value(name);
        } else if let Some(flags) = arg.strip_prefix('-') {
            for (i, flag) in flags.char_indices() {
                if flag == 'm' {
                    return true;
                }
                if short_takes_value(flag) {
                    // The rest of the token, or the next one, is the value.
                    skip_value = i + flag.len_utf8() == flags.len();
                    break;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("check_ib_switch").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn defaults() {
        let config = ProbeConfig::from_cli(&parse(&["-H", "sw01"])).unwrap();
        assert_eq!(config.connection.host, "sw01");
        assert_eq!(config.connection.user, "admin");
        assert!(!config.connection.verify_tls);
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.thresholds, ThresholdConfig::default());
        assert_eq!(config.output_mode, OutputMode::Plain);
    }

    #[test]
    fn missing_host_is_reported() {
        let cli = Cli {
            host: None,
            ..parse(&[])
        };
        assert_matches!(ProbeConfig::from_cli(&cli), Err(ProbeError::MissingHost));

        let blank = parse(&["-H", "  "]);
        assert_matches!(ProbeConfig::from_cli(&blank), Err(ProbeError::MissingHost));
    }

    #[test]
    fn malformed_thresholds_are_config_errors() {
        let cli = parse(&["-H", "sw01", "--load-critical", "4.5,four,3.5"]);
        assert_matches!(ProbeConfig::from_cli(&cli), Err(ProbeError::Config(_)));
    }

    #[test]
    fn zero_timeout_disables_watchdog() {
        let config = ProbeConfig::from_cli(&parse(&["-H", "sw01", "-t", "0"])).unwrap();
        assert_eq!(config.timeout, None);
        assert_eq!(config.connection.request_timeout, None);
    }

    #[test]
    fn short_flags() {
        let cli = parse(&["-H", "sw01", "-u", "monitor", "-p", "secret", "-v", "-m"]);
        let config = ProbeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.connection.user, "monitor");
        assert_eq!(config.connection.password, "secret");
        assert!(cli.verbose);
        assert_eq!(config.output_mode, OutputMode::CheckMk);
    }

    #[test]
    fn checkmk_detected_in_unparsable_arguments() {
        assert!(checkmk_requested(["-m", "--bogus"]));
        assert!(checkmk_requested(["--checkmk", "-t", "soon"]));
        assert!(checkmk_requested(["-vm", "--bogus"]));
        assert!(checkmk_requested(["-H", "sw01", "-mv", "-t", "x"]));
    }

    #[test]
    fn checkmk_not_confused_by_option_values() {
        assert!(!checkmk_requested(["--bogus"]));
        assert!(!checkmk_requested(["-p", "-m", "--bogus"]));
        assert!(!checkmk_requested(["-pm", "--bogus"]));
        assert!(!checkmk_requested(["--password", "-m", "--bogus"]));
        assert!(!checkmk_requested(["-H", "sw01", "--", "-m"]));
        assert!(checkmk_requested(["--password=x", "-m"]));
    }

    #[test]
    fn custom_thresholds() {
        let cli = parse(&[
            "-H",
            "sw01",
            "--memory-warning",
            "70",
            "--temp-critical",
            "90, 100, 70",
        ]);
        let config = ProbeConfig::from_cli(&cli).unwrap();
        assert_eq!(config.thresholds.memory_percent.warning, 70);
        assert_eq!(config.thresholds.temperature.critical, [90.0, 100.0, 70.0]);
    }

    #[test]
    fn password_is_redacted_in_debug_output() {
        let config = ProbeConfig::from_cli(&parse(&["-H", "sw01", "-p", "hunter2"])).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
