//! Infrastructure-as-Code handler (Terraform and OpenTofu).

use super::Handler;
use super::command::{CommandSpec, complete_node, run_sequence};
use super::executor::CommandExecutor;
use super::node::{ComputeNode, NodeResult, OperationDescriptor};
use crate::context::ContextStore;
use crate::error::{OpsError, Result};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Registry name of the IaC handler.
pub const IAC_HANDLER: &str = "terraform_apply";

/// Operation used when a node does not name one.
pub const DEFAULT_IAC_OPERATION: &str = "plan";

/// Plan file written by `plan` and consumed by a non-auto-approved `apply`.
pub const PLAN_FILE: &str = "tfplan";

/// Map an `iac_tool` setting onto the binary this handler drives.
///
/// Only Terraform-compatible CLIs are supported.
pub fn iac_binary(iac_tool: &str) -> Option<&'static str> {
    match iac_tool {
        "terraform" => Some("terraform"),
        "opentofu" | "tofu" => Some("tofu"),
        _ => None,
    }
}

/// A decoded IaC lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IacOperation {
    Init,
    Plan,
    Apply { auto_approve: bool },
    Destroy { auto_approve: bool },
}

impl IacOperation {
    /// Decode a descriptor, rejecting operations outside the closed set.
    pub fn decode(descriptor: &OperationDescriptor) -> Result<Self> {
        let auto_approve = descriptor.flag("auto_approve", false);
        match descriptor.operation.as_str() {
            "init" => Ok(IacOperation::Init),
            "plan" => Ok(IacOperation::Plan),
            "apply" => Ok(IacOperation::Apply { auto_approve }),
            "destroy" => Ok(IacOperation::Destroy { auto_approve }),
            other => Err(OpsError::UnknownOperation(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IacOperation::Init => "init",
            IacOperation::Plan => "plan",
            IacOperation::Apply { .. } => "apply",
            IacOperation::Destroy { .. } => "destroy",
        }
    }

    /// Render the command line for `binary`.
    ///
    /// `apply` without auto-approval applies the saved plan file. `destroy`
    /// without auto-approval is left interactive, matching the tool's own
    /// default.
    pub fn command(self, binary: &str) -> String {
        match self {
            IacOperation::Init => format!("{} init", binary),
            IacOperation::Plan => format!("{} plan -out={}", binary, PLAN_FILE),
            IacOperation::Apply { auto_approve: true } => {
                format!("{} apply -auto-approve", binary)
            }
            IacOperation::Apply { auto_approve: false } => {
                format!("{} apply {}", binary, PLAN_FILE)
            }
            IacOperation::Destroy { auto_approve: true } => {
                format!("{} destroy -auto-approve", binary)
            }
            IacOperation::Destroy { auto_approve: false } => format!("{} destroy", binary),
        }
    }
}

/// Runs IaC lifecycle commands, optionally inside a named workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformHandler {
    binary: String,
}

impl Default for TerraformHandler {
    fn default() -> Self {
        Self::new("terraform")
    }
}

impl TerraformHandler {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn opentofu() -> Self {
        Self::new("tofu")
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// The workspace pre-step, if the node names a workspace.
    fn workspace_steps(&self, workspace: Option<&str>) -> CommandSpec {
        match workspace {
            Some(workspace) => {
                CommandSpec::single(format!("{} workspace select {}", self.binary, workspace))
            }
            None => CommandSpec::new(),
        }
    }
}

impl Handler for TerraformHandler {
    fn name(&self) -> &'static str {
        IAC_HANDLER
    }

    fn synthesize(&self, node: &ComputeNode) -> Result<CommandSpec> {
        let descriptor = node.descriptor(DEFAULT_IAC_OPERATION);
        let operation = IacOperation::decode(&descriptor)?;
        let workspace = descriptor.optional_text("workspace");
        Ok(self
            .workspace_steps(workspace.as_deref())
            .then(operation.command(&self.binary)))
    }

    fn handle(
        &self,
        node: &ComputeNode,
        ctx: &mut dyn ContextStore,
        executor: &dyn CommandExecutor,
    ) -> NodeResult {
        let started = Instant::now();
        let descriptor = node.descriptor(DEFAULT_IAC_OPERATION);
        let workspace = descriptor.optional_text("workspace");
        let operation = IacOperation::decode(&descriptor);

        // The workspace is selected even when the operation turns out to be
        // unknown; that call still counts towards tool_calls_used.
        let mut spec = self.workspace_steps(workspace.as_deref());
        if let Ok(operation) = &operation {
            spec = spec.then(operation.command(&self.binary));
        }

        let mut tool_calls = 0;
        let last = match run_sequence(executor, &spec, &mut tool_calls) {
            Ok(last) => last,
            Err(e) => {
                warn!("node {}: {}", node.id, e);
                return NodeResult::failed(&node.id, e.to_string(), started.elapsed(), tool_calls);
            }
        };

        let operation = match operation {
            Ok(operation) => operation,
            Err(e) => {
                warn!("node {}: {}", node.id, e);
                return NodeResult::failed(&node.id, e.to_string(), started.elapsed(), tool_calls);
            }
        };

        let Some(result) = last else {
            return NodeResult::failed(
                &node.id,
                "no command was executed",
                started.elapsed(),
                tool_calls,
            );
        };

        debug!(
            "node {}: {} {} finished after {} call(s)",
            node.id,
            self.binary,
            operation.name(),
            tool_calls
        );

        let mut output = Map::new();
        output.insert("operation".to_string(), Value::from(operation.name()));
        output.insert(
            "workspace".to_string(),
            workspace.map(Value::from).unwrap_or(Value::Null),
        );
        output.insert("success".to_string(), Value::from(result.success));
        output.insert("output".to_string(), Value::from(result.output.clone()));

        complete_node(node, ctx, output, &result, started, tool_calls)
    }
}
