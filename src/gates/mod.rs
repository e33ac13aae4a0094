//! Pipeline gates.
//!
//! A gate maps a read-only view of the workflow context to one literal from a
//! small closed verdict set. The host engine uses the literal to pick the next
//! branch of a condition node. Gates have no error channel: missing or
//! malformed keys always resolve through documented defaults.

mod registry;
pub mod rules;
pub mod verdict;


pub use registry::{Gate, evaluate_gate, lookup_gate};
pub use rules::{
    container_build_status, deployment_ready, health_check_status, infrastructure_drift,
    pipeline_stage_gate, rollback_needed, security_scan_verdict,
};
pub use verdict::{
    BuildVerdict, DeploymentVerdict, DriftVerdict, HealthVerdict, RollbackVerdict, ScanVerdict,
    Severity, StageVerdict,
};
