//! Implementation of the `opsgate plan` and `opsgate run` commands.

use super::{event_log, handler_registry, load_context, load_node};
use crate::cli::{PlanArgs, RunArgs};
use opsgate::config::Config;
use opsgate::error::{OpsError, Result};
use opsgate::events::{Event, EventAction};
use opsgate::handlers::{DryRunExecutor, NodeResult, ShellExecutor};
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Execute the `opsgate plan` command: print each command on its own line.
pub fn cmd_plan(config_path: &Path, args: PlanArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let registry = handler_registry(&config)?;
    let node = load_node(&args.node)?;

    let spec = registry.plan(&node)?;
    for step in spec.steps() {
        println!("{}", step);
    }
    Ok(())
}

fn shell_executor(config: &Config) -> ShellExecutor {
    let executor = ShellExecutor::new().with_max_output_chars(config.max_output_chars);
    match &config.working_dir {
        Some(dir) => executor.with_working_dir(dir),
        None => executor,
    }
}

/// Execute the `opsgate run` command.
///
/// The NodeResult is printed as JSON. A failed node is reported as an
/// execution error so the process exits with the node-failure code.
pub fn cmd_run(config_path: &Path, args: RunArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let registry = handler_registry(&config)?;
    let node = load_node(&args.node)?;
    let mut ctx = load_context(args.context.as_deref())?;

    let result = if args.dry_run {
        let executor = DryRunExecutor::new();
        let result = registry.run(&node, &mut ctx, &executor)?;
        for command in executor.commands() {
            info!("dry-run: {}", command);
        }
        result
    } else {
        registry.run(&node, &mut ctx, &shell_executor(&config))?
    };

    if !args.dry_run
        && let Some(path) = &args.context
    {
        ctx.save(path)?;
    }

    event_log(&config).record(
        &Event::new(EventAction::NodeRun)
            .with_node(&node.id)
            .with_details(json!({
                "handler": node.handler,
                "status": result.status,
                "tool_calls_used": result.tool_calls_used,
                "dry_run": args.dry_run,
            })),
    )?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    node_outcome(&result)
}

/// Map a finished node onto the command result.
fn node_outcome(result: &NodeResult) -> Result<()> {
    if result.is_success() {
        return Ok(());
    }
    Err(OpsError::Execution(format!(
        "node '{}' failed: {}",
        result.node_id,
        result.error.as_deref().unwrap_or("unknown error")
    )))
}
