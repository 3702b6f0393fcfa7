//! Domain logic for the InfiniBand switch health probe.
//!
//! Everything here is pure: the probe crate performs the device queries and
//! hands the raw JSON documents to [`hardware::telemetry::normalize`].

pub mod error;
pub mod hardware;
pub mod metric_names;
pub mod report;
pub mod severity;
pub mod threshold_validation;
pub mod types;
