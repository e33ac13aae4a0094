//! YAML workflow definitions.
//!
//! A workflow is a list of nodes. Compute nodes run through a handler,
//! condition nodes branch on a gate verdict, transform nodes apply an
//! aggregate transform to the context. Scheduling is left to the host
//! engine; this module parses, validates and resolves branches.
//!
//! ```yaml
//! name: deploy
//! nodes:
//!   - id: readiness
//!     type: condition
//!     condition: deployment_ready
//!     branches:
//!       ready: build
//!       blocked: notify
//!   - id: build
//!     type: compute
//!     handler: container_ops
//!     inputs:
//!       operation: build
//!       tag: myapp:v1
//! ```

use crate::aggregate::Transform;
use crate::context::ContextStore;
use crate::error::{OpsError, Result};
use crate::gates::{Gate, lookup_gate};
use crate::handlers::{ComputeNode, HandlerRegistry};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

/// Regex pattern for valid node ids.
static NODE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("Invalid node ID regex"));

/// Check a node id: lowercase letters, digits and underscores, leading letter.
pub fn validate_node_id(id: &str) -> bool {
    NODE_ID_REGEX.is_match(id)
}

/// A node that branches on a gate verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionNode {
    pub id: String,

    /// Gate name, e.g. `deployment_ready`.
    pub condition: String,

    /// Verdict literal to target node id.
    #[serde(default)]
    pub branches: BTreeMap<String, String>,

    /// Target used when the verdict has no branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ConditionNode {
    /// Evaluate the gate and pick the branch target.
    pub fn resolve(&self, ctx: &dyn ContextStore) -> Result<BranchDecision> {
        let gate = lookup_gate(&self.condition)?;
        let verdict = gate.evaluate(ctx);
        let target = self
            .branches
            .get(verdict)
            .or(self.default.as_ref())
            .cloned();
        Ok(BranchDecision { verdict, target })
    }
}

/// A node that applies an aggregate transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformNode {
    pub id: String,

    /// Transform name, e.g. `merge_deployment_results`.
    pub transform: String,

    #[serde(
        default,
        rename = "output",
        alias = "output_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_key: Option<String>,
}

impl TransformNode {
    pub fn result_key(&self) -> &str {
        self.output_key.as_deref().unwrap_or(&self.id)
    }
}

/// One node of a workflow, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowNode {
    Compute(ComputeNode),
    Condition(ConditionNode),
    Transform(TransformNode),
}

impl WorkflowNode {
    pub fn id(&self) -> &str {
        match self {
            WorkflowNode::Compute(node) => &node.id,
            WorkflowNode::Condition(node) => &node.id,
            WorkflowNode::Transform(node) => &node.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowNode::Compute(_) => "compute",
            WorkflowNode::Condition(_) => "condition",
            WorkflowNode::Transform(_) => "transform",
        }
    }
}

/// Outcome of resolving a condition node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchDecision {
    pub verdict: &'static str,
    pub target: Option<String>,
}

/// A parsed workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
}

impl WorkflowDefinition {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OpsError::UserError(format!(
                "failed to read workflow file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a workflow document. Structural checks are left to [`Self::validate`].
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| OpsError::UserError(format!("failed to parse workflow YAML: {}", e)))
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Every structural problem in the workflow, in node order.
    pub fn problems(&self, handlers: &HandlerRegistry) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        if self.nodes.is_empty() {
            problems.push("workflow has no nodes".to_string());
        }

        for node in &self.nodes {
            let id = node.id();
            if !validate_node_id(id) {
                problems.push(format!(
                    "node id '{}' is invalid (expected lowercase letters, digits, underscores)",
                    id
                ));
            }
            if !seen.insert(id) {
                problems.push(format!("duplicate node id '{}'", id));
            }
        }

        for node in &self.nodes {
            match node {
                WorkflowNode::Compute(compute) => match compute.handler.as_deref() {
                    None => problems.push(format!("node '{}': missing handler", compute.id)),
                    Some(name) => {
                        if let Some(handler) = handlers.get(name) {
                            if let Err(e) = handler.synthesize(compute) {
                                problems.push(format!("node '{}': {}", compute.id, e));
                            }
                        } else {
                            problems.push(format!(
                                "node '{}': unknown handler '{}'",
                                compute.id, name
                            ));
                        }
                    }
                },
                WorkflowNode::Condition(condition) => {
                    self.condition_problems(condition, &mut problems);
                }
                WorkflowNode::Transform(transform) => {
                    if Transform::from_name(&transform.transform).is_none() {
                        problems.push(format!(
                            "node '{}': unknown transform '{}'",
                            transform.id, transform.transform
                        ));
                    }
                }
            }
        }

        problems
    }

    fn condition_problems(&self, condition: &ConditionNode, problems: &mut Vec<String>) {
        let Some(gate) = Gate::from_name(&condition.condition) else {
            problems.push(format!(
                "node '{}': unknown gate '{}'",
                condition.id, condition.condition
            ));
            return;
        };

        let verdicts = gate.verdicts();
        for (verdict, target) in &condition.branches {
            if !verdicts.iter().any(|known| *known == verdict) {
                problems.push(format!(
                    "node '{}': '{}' is not a verdict of {} (expected one of: {})",
                    condition.id,
                    verdict,
                    gate,
                    verdicts.join(", ")
                ));
            }
            if self.node(target).is_none() {
                problems.push(format!(
                    "node '{}': branch '{}' targets unknown node '{}'",
                    condition.id, verdict, target
                ));
            }
        }
        if let Some(target) = &condition.default
            && self.node(target).is_none()
        {
            problems.push(format!(
                "node '{}': default branch targets unknown node '{}'",
                condition.id, target
            ));
        }
    }

    pub fn validate(&self, handlers: &HandlerRegistry) -> Result<()> {
        let problems = self.problems(handlers);
        if problems.is_empty() {
            return Ok(());
        }
        Err(OpsError::Validation(format!(
            "workflow '{}' has {} problem(s):\n  - {}",
            self.name,
            problems.len(),
            problems.join("\n  - ")
        )))
    }

    /// Resolve the branch taken by condition node `id`.
    pub fn resolve_branch(&self, id: &str, ctx: &dyn ContextStore) -> Result<BranchDecision> {
        match self.node(id) {
            Some(WorkflowNode::Condition(condition)) => condition.resolve(ctx),
            Some(other) => Err(OpsError::UserError(format!(
                "node '{}' is a {} node, not a condition",
                id,
                other.kind()
            ))),
            None => Err(OpsError::UserError(format!(
                "workflow '{}' has no node '{}'",
                self.name, id
            ))),
        }
    }
}
