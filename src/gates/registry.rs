//! Name-keyed gate registry used by condition nodes.

use super::rules;
use super::verdict::{
    BuildVerdict, DeploymentVerdict, DriftVerdict, HealthVerdict, RollbackVerdict, ScanVerdict,
    StageVerdict,
};
use crate::context::ContextStore;
use crate::error::{OpsError, Result};
use std::fmt;
use tracing::debug;

/// Every gate a condition node may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    DeploymentReady,
    HealthCheckStatus,
    RollbackNeeded,
    ContainerBuildStatus,
    InfrastructureDrift,
    SecurityScanVerdict,
    PipelineStageGate,
}

impl Gate {
    /// All gates in registration order.
    pub const ALL: &'static [Gate] = &[
        Gate::DeploymentReady,
        Gate::HealthCheckStatus,
        Gate::RollbackNeeded,
        Gate::ContainerBuildStatus,
        Gate::InfrastructureDrift,
        Gate::SecurityScanVerdict,
        Gate::PipelineStageGate,
    ];

    /// The name workflow YAML uses to reference this gate.
    pub fn name(self) -> &'static str {
        match self {
            Gate::DeploymentReady => "deployment_ready",
            Gate::HealthCheckStatus => "health_check_status",
            Gate::RollbackNeeded => "rollback_needed",
            Gate::ContainerBuildStatus => "container_build_status",
            Gate::InfrastructureDrift => "infrastructure_drift",
            Gate::SecurityScanVerdict => "security_scan_verdict",
            Gate::PipelineStageGate => "pipeline_stage_gate",
        }
    }

    /// Look a gate up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Gate::ALL.iter().copied().find(|g| g.name() == name)
    }

    /// The closed verdict set of this gate.
    pub fn verdicts(self) -> Vec<&'static str> {
        fn literals<T: Copy>(all: &[T], as_str: fn(T) -> &'static str) -> Vec<&'static str> {
            all.iter().map(|v| as_str(*v)).collect()
        }

        match self {
            Gate::DeploymentReady => literals(DeploymentVerdict::ALL, DeploymentVerdict::as_str),
            Gate::HealthCheckStatus => literals(HealthVerdict::ALL, HealthVerdict::as_str),
            Gate::RollbackNeeded => literals(RollbackVerdict::ALL, RollbackVerdict::as_str),
            Gate::ContainerBuildStatus => literals(BuildVerdict::ALL, BuildVerdict::as_str),
            Gate::InfrastructureDrift => literals(DriftVerdict::ALL, DriftVerdict::as_str),
            Gate::SecurityScanVerdict => literals(ScanVerdict::ALL, ScanVerdict::as_str),
            Gate::PipelineStageGate => literals(StageVerdict::ALL, StageVerdict::as_str),
        }
    }

    /// Evaluate the gate and return its verdict literal.
    pub fn evaluate(self, ctx: &dyn ContextStore) -> &'static str {
        let verdict = match self {
            Gate::DeploymentReady => rules::deployment_ready(ctx).as_str(),
            Gate::HealthCheckStatus => rules::health_check_status(ctx).as_str(),
            Gate::RollbackNeeded => rules::rollback_needed(ctx).as_str(),
            Gate::ContainerBuildStatus => rules::container_build_status(ctx).as_str(),
            Gate::InfrastructureDrift => rules::infrastructure_drift(ctx).as_str(),
            Gate::SecurityScanVerdict => rules::security_scan_verdict(ctx).as_str(),
            Gate::PipelineStageGate => rules::pipeline_stage_gate(ctx).as_str(),
        };
        debug!("gate {} -> {}", self.name(), verdict);
        verdict
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a gate by name, with a user-facing error for unknown names.
pub fn lookup_gate(name: &str) -> Result<Gate> {
    Gate::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Gate::ALL.iter().map(|g| g.name()).collect();
        OpsError::UserError(format!(
            "unknown gate '{}'\nKnown gates: {}",
            name,
            known.join(", ")
        ))
    })
}

/// Evaluate a gate by name.
pub fn evaluate_gate(name: &str, ctx: &dyn ContextStore) -> Result<&'static str> {
    Ok(lookup_gate(name)?.evaluate(ctx))
}
