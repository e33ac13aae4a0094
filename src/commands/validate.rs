//! Implementation of the `opsgate validate` command.

use super::handler_registry;
use crate::cli::ValidateArgs;
use opsgate::config::Config;
use opsgate::error::Result;
use opsgate::workflow::WorkflowDefinition;
use std::path::Path;

/// Execute the `opsgate validate` command.
///
/// Checks node ids, handler/gate/transform names, compute-node operations and
/// branch tables against the handlers configured in `opsgate.yaml`.
pub fn cmd_validate(config_path: &Path, args: ValidateArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let registry = handler_registry(&config)?;
    let workflow = WorkflowDefinition::load(&args.workflow)?;

    workflow.validate(&registry)?;

    println!(
        "workflow '{}' is valid ({} nodes)",
        workflow.name,
        workflow.nodes.len()
    );
    Ok(())
}
