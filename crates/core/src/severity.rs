//! Check result severity shared by every evaluated dimension.

/// Severity of a check result.
///
/// Variants are declared in escalation order so the derived `Ord` can be
/// used directly for aggregation (`max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    /// Data could not be obtained or computed. Never produced by threshold
    /// evaluation itself.
    Unknown,
}

impl Severity {
    /// Process exit code expected by Nagios-compatible frontends.
    pub fn exit_code(self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// First four characters of the name, as used by Check_MK local checks.
    pub fn short_name(self) -> &'static str {
        let name = self.as_str();
        &name[..name.len().min(4)]
    }

    /// `true` for WARNING and CRITICAL.
    pub fn is_problem(self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine per-dimension results into one verdict.
///
/// Every element is inspected; the result is the most severe one, or `Ok`
/// for an empty input.
pub fn aggregate<I>(states: I) -> Severity
where
    I: IntoIterator<Item = Severity>,
{
    states.into_iter().max().unwrap_or(Severity::Ok)
}
