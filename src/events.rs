//! Append-only audit log for opsgate.
//!
//! Events are stored in NDJSON format (one JSON object per line) at the path
//! configured by `events_log` in `opsgate.yaml`. Nothing is written when no
//! path is configured.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: `node_run`, `gate_evaluated`, `transform_applied` or `capability_configured`
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `node`: Optional node id for node-specific events
//! - `details`: Freeform object with action-specific details

use crate::error::{OpsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// A compute node ran through its handler.
    NodeRun,
    /// A gate produced a verdict.
    GateEvaluated,
    /// An aggregate transform was applied to the context.
    TransformApplied,
    /// Capability settings were stored.
    CapabilityConfigured,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::NodeRun => write!(f, "node_run"),
            EventAction::GateEvaluated => write!(f, "gate_evaluated"),
            EventAction::TransformApplied => write!(f, "transform_applied"),
            EventAction::CapabilityConfigured => write!(f, "capability_configured"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,

    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            node: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node = Some(node_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| OpsError::UserError(format!("failed to serialize event to JSON: {}", e)))
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event as one line to `path`, creating parent directories.
pub fn append_event(path: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            OpsError::UserError(format!(
                "failed to create events directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            OpsError::UserError(format!(
                "failed to open events file '{}': {}",
                path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        OpsError::UserError(format!(
            "failed to write event to '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        OpsError::UserError(format!(
            "failed to sync events file '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Optional event sink; a log without a path drops every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, event: &Event) -> Result<()> {
        match &self.path {
            Some(path) => append_event(path, event),
            None => Ok(()),
        }
    }
}
