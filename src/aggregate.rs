//! Fan-in transforms over results already present in the workflow context.
//!
//! Transforms run after parallel branches join. They read named entries from
//! the context and produce a fixed-shape summary object; they never execute
//! anything themselves.

use crate::context::{ContextStore, field_bool};
use crate::error::{OpsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Consolidated outcome of the post-deploy parallel tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDeploymentResults {
    pub all_tasks_complete: bool,
    pub all_tasks_success: bool,
    pub monitoring_updated: bool,
    pub notification_sent: bool,
    pub docs_updated: bool,
}

/// Flat deployment summary for notification and reporting consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSummary {
    pub environment: String,
    pub version: String,
    pub status: String,
    pub duration_seconds: f64,
    pub rollback_performed: bool,
    pub changes: String,
}

/// Merge `monitoring_result`, `notification_result` and `docs_result`.
///
/// Monitoring and notification are required and count as failed when absent.
/// The docs update is optional: a missing docs result does not fail the
/// overall merge, but is still reported as `docs_updated: false`.
pub fn merge_deployment_results(ctx: &dyn ContextStore) -> MergedDeploymentResults {
    let monitoring = ctx.get_object("monitoring_result");
    let notification = ctx.get_object("notification_result");
    let docs = ctx.get_object("docs_result");

    let monitoring_updated = field_bool(&monitoring, "success", false);
    let notification_sent = field_bool(&notification, "success", false);

    MergedDeploymentResults {
        all_tasks_complete: true,
        all_tasks_success: monitoring_updated
            && notification_sent
            && field_bool(&docs, "success", true),
        monitoring_updated,
        notification_sent,
        docs_updated: field_bool(&docs, "success", false),
    }
}

/// Flatten deployment scalars from the context into a summary.
pub fn generate_deployment_summary(ctx: &dyn ContextStore) -> DeploymentSummary {
    DeploymentSummary {
        environment: ctx.get_string("target_env", "unknown"),
        version: ctx.get_string("deploy_version", "unknown"),
        status: ctx.get_string("status", "unknown"),
        duration_seconds: ctx.get_f64("duration", 0.0),
        rollback_performed: ctx.get_bool("rollback_performed", false),
        changes: ctx.get_string("change_summary", "No changes recorded"),
    }
}

/// Every transform a workflow node may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    MergeDeploymentResults,
    GenerateDeploymentSummary,
}

impl Transform {
    pub const ALL: &'static [Transform] = &[
        Transform::MergeDeploymentResults,
        Transform::GenerateDeploymentSummary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Transform::MergeDeploymentResults => "merge_deployment_results",
            Transform::GenerateDeploymentSummary => "generate_deployment_summary",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Transform::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Apply the transform, producing its summary as a JSON object.
    pub fn apply(self, ctx: &dyn ContextStore) -> Result<Value> {
        let value = match self {
            Transform::MergeDeploymentResults => {
                serde_json::to_value(merge_deployment_results(ctx))?
            }
            Transform::GenerateDeploymentSummary => {
                serde_json::to_value(generate_deployment_summary(ctx))?
            }
        };
        Ok(value)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a transform by name, with a user-facing error for unknown names.
pub fn lookup_transform(name: &str) -> Result<Transform> {
    Transform::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Transform::ALL.iter().map(|t| t.name()).collect();
        OpsError::UserError(format!(
            "unknown transform '{}'\nKnown transforms: {}",
            name,
            known.join(", ")
        ))
    })
}
