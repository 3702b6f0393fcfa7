use ibswitch_core::error::CoreError;
use ibswitch_core::report::Report;

use crate::client::TransportError;

/// Everything that ends a run with an UNKNOWN result.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Hostname missing!")]
    MissingHost,

    #[error("{0}")]
    Config(CoreError),

    #[error("Failed to initialise HTTP client: {0}")]
    ClientSetup(TransportError),

    #[error("Query '{command}' failed: {source}")]
    Transport {
        command: String,
        #[source]
        source: TransportError,
    },

    #[error("Unexpected switch response: {0}")]
    Data(CoreError),

    #[error("plugin timed out after {0} sec!")]
    Timeout(u64),

    #[error("plugin killed by monitoring")]
    Killed,
}

impl ProbeError {
    /// UNKNOWN report carrying this error's message and no performance data.
    pub fn into_report(self) -> Report {
        Report::unknown(self.to_string())
    }
}
