//! Switch hardware monitoring domain logic.
//!
//! Contains telemetry normalization and the threshold evaluation engine.
//! All logic in this module is pure (no network access) so it can be tested
//! in isolation.

pub mod telemetry;
pub mod thresholds;
