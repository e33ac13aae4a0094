//! Configuration model for opsgate.
//!
//! This module defines the Config struct that represents `opsgate.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! defaults for every field, and validation of config values. The file also
//! backs the capability config store used by the CLI.

mod model;
mod operations;
mod orchestrator;

#[cfg(test)]
mod tests;

pub use model::{Config, DEFAULT_CONFIG_FILE};
pub use orchestrator::FileOrchestrator;
