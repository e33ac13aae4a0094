//! Command implementations for opsgate.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the file-loading helpers they share.

mod config;
mod gate;
mod run;
mod transform;
mod validate;

use crate::cli::{Command, ConfigAction};
use opsgate::capabilities::{get_container_settings, get_infrastructure_settings};
use opsgate::config::{Config, FileOrchestrator};
use opsgate::context::WorkflowContext;
use opsgate::error::{OpsError, Result};
use opsgate::events::EventLog;
use opsgate::handlers::{ComputeNode, HandlerRegistry};
use std::path::Path;
use tracing::debug;

/// Dispatch a command to its implementation.
pub fn dispatch(config_path: &Path, command: Command) -> Result<()> {
    match command {
        Command::Gate(args) => gate::cmd_gate(config_path, args),
        Command::Gates => gate::cmd_gates(),
        Command::Transform(args) => transform::cmd_transform(config_path, args),
        Command::Plan(args) => run::cmd_plan(config_path, args),
        Command::Run(args) => run::cmd_run(config_path, args),
        Command::Validate(args) => validate::cmd_validate(config_path, args),
        Command::Branch(args) => gate::cmd_branch(config_path, args),
        Command::Config(config_cmd) => match config_cmd.action {
            ConfigAction::Show(args) => config::cmd_config_show(config_path, args),
            ConfigAction::Set(args) => config::cmd_config_set(config_path, args),
        },
    }
}

/// Load the context file, or start from an empty context.
fn load_context(path: Option<&Path>) -> Result<WorkflowContext> {
    match path {
        Some(path) => WorkflowContext::load(path),
        None => Ok(WorkflowContext::new()),
    }
}

/// Load a compute node from a YAML (or JSON) file.
fn load_node(path: &Path) -> Result<ComputeNode> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        OpsError::UserError(format!(
            "failed to read node file '{}': {}",
            path.display(),
            e
        ))
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        OpsError::UserError(format!(
            "failed to parse node file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Handlers configured from the stored container and infrastructure settings.
fn handler_registry(config: &Config) -> Result<HandlerRegistry> {
    let orchestrator = FileOrchestrator::new(config.clone());
    let container = get_container_settings(&orchestrator);
    let infrastructure = get_infrastructure_settings(&orchestrator);
    debug!(
        "handlers: runtime={}, iac_tool={}",
        container.runtime, infrastructure.iac_tool
    );
    HandlerRegistry::from_settings(&container, &infrastructure)
}

fn event_log(config: &Config) -> EventLog {
    EventLog::new(config.events_log.clone())
}
