//! Watchdog around a check run.
//!
//! The run races against the deadline and SIGTERM. Whichever finishes first
//! decides the report; the losers are dropped, which cancels any in-flight
//! request.

use std::future::Future;
use std::time::Duration;

use ibswitch_core::report::Report;

use crate::error::ProbeError;

/// Run `check` under the deadline, also listening for SIGTERM.
pub async fn supervise<F>(check: F, timeout: Option<Duration>) -> Report
where
    F: Future<Output = Result<Report, ProbeError>>,
{
    supervise_with(check, timeout, terminate_signal()).await
}

/// Like [`supervise`] with an explicit termination future.
pub async fn supervise_with<F, S>(check: F, timeout: Option<Duration>, terminate: S) -> Report
where
    F: Future<Output = Result<Report, ProbeError>>,
    S: Future<Output = ()>,
{
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        () = terminate => {
            tracing::warn!("Received SIGTERM, aborting check");
            ProbeError::Killed.into_report()
        }
        () = deadline => {
            let secs = timeout.map(|t| t.as_secs()).unwrap_or_default();
            tracing::warn!(timeout_secs = secs, "Check timed out");
            ProbeError::Timeout(secs).into_report()
        }
        result = check => result.unwrap_or_else(ProbeError::into_report),
    }
}

/// Resolves on SIGTERM. Never resolves where signals are unavailable.
async fn terminate_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use ibswitch_core::severity::Severity;

    use super::*;

    fn ok_report() -> Report {
        Report {
            severity: Severity::Ok,
            message: "[PASSED] All Module(s) OK".into(),
            perf_data: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn finished_check_passes_through() {
        let report = supervise_with(
            async { Ok(ok_report()) },
            Some(Duration::from_secs(5)),
            std::future::pending(),
        )
        .await;
        assert_eq!(report, ok_report());
    }

    #[tokio::test(start_paused = true)]
    async fn check_error_becomes_unknown() {
        let report = supervise_with(
            async { Err(ProbeError::MissingHost) },
            None,
            std::future::pending(),
        )
        .await;
        assert_eq!(report.severity, Severity::Unknown);
        assert_eq!(report.message, "Hostname missing!");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_reports_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Ok(ok_report())
        };
        let report = supervise_with(slow, Some(Duration::from_secs(60)), std::future::pending()).await;
        assert_eq!(report.severity, Severity::Unknown);
        assert_eq!(report.message, "plugin timed out after 60 sec!");
        assert!(report.perf_data.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn no_deadline_waits_for_check() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(ok_report())
        };
        let report = supervise_with(slow, None, std::future::pending()).await;
        assert_eq!(report.severity, Severity::Ok);
    }

    #[tokio::test(start_paused = true)]
    async fn termination_takes_priority() {
        let report = supervise_with(
            async { Ok(ok_report()) },
            Some(Duration::from_secs(60)),
            async {},
        )
        .await;
        assert_eq!(report.message, "plugin killed by monitoring");
        assert_eq!(report.exit_code(), 3);
    }
}
