//! Compute-node handlers: operation descriptors in, command sequences out.
//!
//! A handler decodes the node's `operation` into a closed set of variants,
//! renders the command line(s), runs them through a [`CommandExecutor`] and
//! normalizes the outcome into a [`NodeResult`] plus a context entry.

mod command;
mod container;
mod executor;
mod iac;
mod node;
mod registry;


use crate::context::ContextStore;
use crate::error::Result;

pub use command::{CommandSpec, run_sequence};
pub use container::{
    CONTAINER_HANDLER, ContainerOperation, ContainerOpsHandler, DEFAULT_CONTAINER_OPERATION,
};
pub use executor::{
    CommandExecutor, CommandResult, DEFAULT_MAX_OUTPUT_CHARS, DryRunExecutor, MAX_OUTPUT_LINES,
    SHELL_TOOL, ShellExecutor, truncate_output,
};
pub use iac::{
    DEFAULT_IAC_OPERATION, IAC_HANDLER, IacOperation, PLAN_FILE, TerraformHandler, iac_binary,
};
pub use node::{ComputeNode, NodeResult, NodeStatus, OperationDescriptor};
pub use registry::HandlerRegistry;

/// A compute-node handler.
///
/// `handle` never returns an error: unknown operations, failed commands and
/// executor errors all come back as a `Failed` [`NodeResult`].
pub trait Handler {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Command sequence the node would run, without running it.
    fn synthesize(&self, node: &ComputeNode) -> Result<CommandSpec>;

    fn handle(
        &self,
        node: &ComputeNode,
        ctx: &mut dyn ContextStore,
        executor: &dyn CommandExecutor,
    ) -> NodeResult;
}
