//! Config struct definition and default implementation.

use crate::capabilities::Settings;
use crate::handlers::DEFAULT_MAX_OUTPUT_CHARS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "opsgate.yaml";

/// Configuration for opsgate.
///
/// This struct represents the contents of `opsgate.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Capability storage
    // =========================================================================
    /// Whether the orchestrator exposes a config service.
    ///
    /// When false, capability settings are written to `legacy` instead.
    #[serde(default = "default_true")]
    pub capability_service: bool,

    /// Service-backed capability settings, keyed by config name.
    #[serde(default)]
    pub capabilities: BTreeMap<String, Settings>,

    /// Legacy attribute bag, keyed by attribute name.
    #[serde(default)]
    pub legacy: BTreeMap<String, Settings>,

    // =========================================================================
    // Execution
    // =========================================================================
    /// Directory commands run in (default: the current directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// NDJSON audit log; no events are written when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_log: Option<PathBuf>,

    /// Executor output is truncated to this many characters.
    #[serde(default = "default_max_output_chars")]
    pub max_output_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capability_service: true,
            capabilities: BTreeMap::new(),
            legacy: BTreeMap::new(),
            working_dir: None,
            events_log: None,
            max_output_chars: default_max_output_chars(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_output_chars() -> usize {
    DEFAULT_MAX_OUTPUT_CHARS
}
