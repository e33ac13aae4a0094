//! Container lifecycle handler (Docker, Podman, or any CLI-compatible runtime).

use super::Handler;
use super::command::{CommandSpec, complete_node, run_sequence};
use super::executor::CommandExecutor;
use super::node::{ComputeNode, NodeResult, OperationDescriptor};
use crate::context::ContextStore;
use crate::error::{OpsError, Result};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Registry name of the container handler.
pub const CONTAINER_HANDLER: &str = "container_ops";

/// Operation used when a node does not name one.
pub const DEFAULT_CONTAINER_OPERATION: &str = "build";

/// A decoded container operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerOperation {
    Build { dockerfile: String, tag: String },
    Push { tag: String },
    Pull { image: String },
    Run { image: String },
    Stop { container_id: String },
}

impl ContainerOperation {
    /// Decode a descriptor, rejecting operations outside the closed set.
    pub fn decode(descriptor: &OperationDescriptor) -> Result<Self> {
        let operation = match descriptor.operation.as_str() {
            "build" => ContainerOperation::Build {
                dockerfile: descriptor.text("dockerfile", "Dockerfile"),
                tag: descriptor.text("tag", "latest"),
            },
            "push" => ContainerOperation::Push {
                tag: descriptor.text("tag", "latest"),
            },
            "pull" => ContainerOperation::Pull {
                image: descriptor.text("image", ""),
            },
            "run" => ContainerOperation::Run {
                image: descriptor.text("image", ""),
            },
            "stop" => ContainerOperation::Stop {
                container_id: descriptor.text("container_id", ""),
            },
            other => return Err(OpsError::UnknownOperation(other.to_string())),
        };
        Ok(operation)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContainerOperation::Build { .. } => "build",
            ContainerOperation::Push { .. } => "push",
            ContainerOperation::Pull { .. } => "pull",
            ContainerOperation::Run { .. } => "run",
            ContainerOperation::Stop { .. } => "stop",
        }
    }

    /// Render the command line for `runtime`.
    pub fn command(&self, runtime: &str) -> String {
        match self {
            ContainerOperation::Build { dockerfile, tag } => {
                format!("{} build -f {} -t {} .", runtime, dockerfile, tag)
            }
            ContainerOperation::Push { tag } => format!("{} push {}", runtime, tag),
            ContainerOperation::Pull { image } => format!("{} pull {}", runtime, image),
            ContainerOperation::Run { image } => format!("{} run -d {}", runtime, image),
            ContainerOperation::Stop { container_id } => {
                format!("{} stop {}", runtime, container_id)
            }
        }
    }
}

/// Builds, pushes, pulls, runs and stops containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOpsHandler {
    runtime: String,
}

impl Default for ContainerOpsHandler {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerOpsHandler {
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    pub fn podman() -> Self {
        Self::new("podman")
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }
}

impl Handler for ContainerOpsHandler {
    fn name(&self) -> &'static str {
        CONTAINER_HANDLER
    }

    fn synthesize(&self, node: &ComputeNode) -> Result<CommandSpec> {
        let operation = ContainerOperation::decode(&node.descriptor(DEFAULT_CONTAINER_OPERATION))?;
        Ok(CommandSpec::single(operation.command(&self.runtime)))
    }

    fn handle(
        &self,
        node: &ComputeNode,
        ctx: &mut dyn ContextStore,
        executor: &dyn CommandExecutor,
    ) -> NodeResult {
        let started = Instant::now();
        let descriptor = node.descriptor(DEFAULT_CONTAINER_OPERATION);

        let operation = match ContainerOperation::decode(&descriptor) {
            Ok(operation) => operation,
            Err(e) => {
                warn!("node {}: {}", node.id, e);
                return NodeResult::failed(&node.id, e.to_string(), started.elapsed(), 0);
            }
        };

        let spec = CommandSpec::single(operation.command(&self.runtime));
        debug!("node {}: container {} via {}", node.id, operation.name(), self.runtime);

        let mut tool_calls = 0;
        let result = match run_sequence(executor, &spec, &mut tool_calls) {
            Ok(Some(result)) => result,
            Ok(None) => {
                return NodeResult::failed(
                    &node.id,
                    "no command was executed",
                    started.elapsed(),
                    tool_calls,
                );
            }
            Err(e) => {
                warn!("node {}: {}", node.id, e);
                return NodeResult::failed(&node.id, e.to_string(), started.elapsed(), tool_calls);
            }
        };

        let mut output = Map::new();
        output.insert("operation".to_string(), Value::from(operation.name()));
        output.insert("success".to_string(), Value::from(result.success));
        output.insert("output".to_string(), Value::from(result.output.clone()));

        complete_node(node, ctx, output, &result, started, tool_calls)
    }
}
