//! Implementation of the `gate`, `gates` and `branch` commands.

use super::{event_log, load_context};
use crate::cli::{BranchArgs, GateArgs};
use opsgate::config::Config;
use opsgate::error::Result;
use opsgate::events::{Event, EventAction};
use opsgate::gates::{Gate, lookup_gate};
use opsgate::workflow::WorkflowDefinition;
use serde_json::json;
use std::path::Path;

/// Execute the `opsgate gate` command.
///
/// Prints the verdict literal on its own line so scripts can branch on it.
pub fn cmd_gate(config_path: &Path, args: GateArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let gate = lookup_gate(&args.name)?;
    let ctx = load_context(args.context.as_deref())?;

    let verdict = gate.evaluate(&ctx);

    event_log(&config).record(
        &Event::new(EventAction::GateEvaluated)
            .with_details(json!({"gate": gate.name(), "verdict": verdict})),
    )?;

    println!("{}", verdict);
    Ok(())
}

/// Execute the `opsgate gates` command.
pub fn cmd_gates() -> Result<()> {
    let width = Gate::ALL.iter().map(|g| g.name().len()).max().unwrap_or(0);
    for gate in Gate::ALL {
        println!("{:width$}  {}", gate.name(), gate.verdicts().join(", "), width = width);
    }
    Ok(())
}

/// Execute the `opsgate branch` command.
pub fn cmd_branch(config_path: &Path, args: BranchArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let workflow = WorkflowDefinition::load(&args.workflow)?;
    let ctx = load_context(args.context.as_deref())?;

    let decision = workflow.resolve_branch(&args.node, &ctx)?;

    event_log(&config).record(
        &Event::new(EventAction::GateEvaluated)
            .with_node(&args.node)
            .with_details(json!({
                "workflow": workflow.name,
                "verdict": decision.verdict,
                "target": decision.target,
            })),
    )?;

    match &decision.target {
        Some(target) => println!("{} -> {}", decision.verdict, target),
        None => println!("{} -> (no branch)", decision.verdict),
    }
    Ok(())
}
