//! `ibswitch-probe` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod check;
pub mod client;
pub mod config;
pub mod error;
pub mod supervisor;
