//! Handler lookup by registry name.

use super::Handler;
use super::command::CommandSpec;
use super::container::ContainerOpsHandler;
use super::executor::CommandExecutor;
use super::iac::{TerraformHandler, iac_binary};
use super::node::{ComputeNode, NodeResult};
use crate::capabilities::{ContainerSettings, InfrastructureSettings};
use crate::context::ContextStore;
use crate::error::{OpsError, Result};
use std::collections::BTreeMap;
use tracing::info;

/// Handlers keyed by their registry name.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<&'static str, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Container handler on docker, IaC handler on terraform.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ContainerOpsHandler::default());
        registry.register(TerraformHandler::default());
        registry
    }

    /// Build the handlers from capability settings.
    pub fn from_settings(
        container: &ContainerSettings,
        infrastructure: &InfrastructureSettings,
    ) -> Result<Self> {
        if container.runtime.trim().is_empty() {
            return Err(OpsError::UserError(
                "container runtime is empty\nFix: set container_settings runtime=docker"
                    .to_string(),
            ));
        }
        let binary = iac_binary(&infrastructure.iac_tool).ok_or_else(|| {
            OpsError::UserError(format!(
                "unsupported iac_tool '{}'\nFix: use terraform or opentofu",
                infrastructure.iac_tool
            ))
        })?;

        let mut registry = Self::new();
        registry.register(ContainerOpsHandler::new(container.runtime.clone()));
        registry.register(TerraformHandler::new(binary));
        Ok(registry)
    }

    /// Register a handler, replacing any handler with the same name.
    pub fn register<H: Handler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Handler> {
        self.handlers.get(name).map(|handler| handler.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn Handler> {
        self.get(name).ok_or_else(|| {
            OpsError::UserError(format!(
                "unknown handler '{}'\nKnown handlers: {}",
                name,
                self.names().join(", ")
            ))
        })
    }

    fn handler_for(&self, node: &ComputeNode) -> Result<&dyn Handler> {
        let name = node.handler.as_deref().ok_or_else(|| {
            OpsError::UserError(format!("node '{}' does not name a handler", node.id))
        })?;
        self.lookup(name)
    }

    /// Commands the node would run.
    pub fn plan(&self, node: &ComputeNode) -> Result<CommandSpec> {
        self.handler_for(node)?.synthesize(node)
    }

    /// Dispatch a node to its handler.
    pub fn run(
        &self,
        node: &ComputeNode,
        ctx: &mut dyn ContextStore,
        executor: &dyn CommandExecutor,
    ) -> Result<NodeResult> {
        let handler = self.handler_for(node)?;
        info!("running node {} with {}", node.id, handler.name());
        Ok(handler.handle(node, ctx, executor))
    }
}
