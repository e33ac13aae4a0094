//! Decision rules for the seven pipeline gates.
//!
//! Each rule reads a handful of context keys (with defaults) and returns one
//! verdict. Rules are pure: the same context always yields the same verdict,
//! and no input can make a rule fail. Branch order inside each rule matters.

use super::verdict::{
    BuildVerdict, DeploymentVerdict, DriftVerdict, HealthVerdict, RollbackVerdict, ScanVerdict,
    Severity, StageVerdict,
};
use crate::context::{ContextStore, field_bool, field_f64, field_str};
use tracing::{info, warn};

/// Error rate above which a deployment is rolled back outright.
pub const ROLLBACK_ERROR_RATE: f64 = 0.1;

/// Error rate above which a deployment is kept under observation.
pub const MONITOR_ERROR_RATE: f64 = 0.01;

/// Combined create+update count above which drift counts as major.
pub const MAJOR_DRIFT_CHANGES: f64 = 10.0;

/// Default image size ceiling in MB.
pub const DEFAULT_MAX_IMAGE_SIZE_MB: f64 = 2000.0;

/// Multi-factor readiness check: config, dependencies, then approvals.
///
/// Keys: `config_valid` (false), `dependencies_met` (false),
/// `approval_status` ("pending"), `environment` ("development").
pub fn deployment_ready(ctx: &dyn ContextStore) -> DeploymentVerdict {
    let config_valid = ctx.get_bool("config_valid", false);
    let dependencies_met = ctx.get_bool("dependencies_met", false);
    let approval_status = ctx.get_string("approval_status", "pending");
    let environment = ctx.get_string("environment", "development");

    if !config_valid {
        warn!("deployment blocked: configuration invalid");
        return DeploymentVerdict::Failed;
    }

    if !dependencies_met {
        info!("deployment blocked: waiting for dependencies");
        return DeploymentVerdict::Blocked;
    }

    // Production always needs an explicit approval.
    if environment == "production" && approval_status != "approved" {
        return DeploymentVerdict::Blocked;
    }

    if approval_status == "rejected" {
        return DeploymentVerdict::Failed;
    }

    DeploymentVerdict::Ready
}

/// Classify endpoint health from `health_results` (endpoint → `{status}`).
///
/// An empty result set is unhealthy. Entries that are not objects, or whose
/// `status` is anything other than `"healthy"`, count as unhealthy endpoints.
pub fn health_check_status(ctx: &dyn ContextStore) -> HealthVerdict {
    let results = ctx.get_object("health_results");
    let min_healthy = ctx.get_f64("min_healthy_pct", 0.8);

    if results.is_empty() {
        return HealthVerdict::Unhealthy;
    }

    let total = results.len();
    let healthy = results
        .values()
        .filter(|entry| endpoint_status(entry) == "healthy")
        .count();
    let healthy_fraction = healthy as f64 / total as f64;

    if healthy_fraction >= 1.0 {
        HealthVerdict::Healthy
    } else if healthy_fraction >= min_healthy {
        HealthVerdict::Degraded
    } else {
        HealthVerdict::Unhealthy
    }
}

/// Decide between rolling back, monitoring, or declaring a deploy stable.
///
/// Keys: `deploy_result.success` (false), `health_status` ("unknown"),
/// `error_rate` (0).
pub fn rollback_needed(ctx: &dyn ContextStore) -> RollbackVerdict {
    let deploy_result = ctx.get_object("deploy_result");
    let health_status = ctx.get_string("health_status", "unknown");
    let error_rate = ctx.get_f64("error_rate", 0.0);

    if !field_bool(&deploy_result, "success", false) {
        return RollbackVerdict::Rollback;
    }

    if health_status == "unhealthy" {
        return RollbackVerdict::Rollback;
    }

    if error_rate > ROLLBACK_ERROR_RATE {
        return RollbackVerdict::Rollback;
    }

    if health_status == "degraded" || error_rate > MONITOR_ERROR_RATE {
        return RollbackVerdict::Monitor;
    }

    RollbackVerdict::Stable
}

/// Check a container build result against the image size ceiling.
///
/// Keys: `build_result.success` (false), `image_size` (0, MB),
/// `max_size` (2000, MB).
pub fn container_build_status(ctx: &dyn ContextStore) -> BuildVerdict {
    let build_result = ctx.get_object("build_result");
    let image_size = ctx.get_f64("image_size", 0.0);
    let max_size = ctx.get_f64("max_size", DEFAULT_MAX_IMAGE_SIZE_MB);

    if !field_bool(&build_result, "success", false) {
        return BuildVerdict::Failed;
    }

    if image_size > max_size {
        warn!("image size {}MB exceeds limit {}MB", image_size, max_size);
        return BuildVerdict::Warning;
    }

    BuildVerdict::Success
}

/// Grade IaC plan drift from `plan_changes` (`create`, `update`, `destroy`).
///
/// Any destroy wins over every other count.
pub fn infrastructure_drift(ctx: &dyn ContextStore) -> DriftVerdict {
    let changes = ctx.get_object("plan_changes");

    if changes.is_empty() {
        return DriftVerdict::NoDrift;
    }

    let create = field_f64(&changes, "create", 0.0);
    let update = field_f64(&changes, "update", 0.0);
    let destroy = field_f64(&changes, "destroy", 0.0);

    if destroy > 0.0 {
        return DriftVerdict::Destructive;
    }

    if create + update > MAJOR_DRIFT_CHANGES {
        return DriftVerdict::MajorDrift;
    }

    if create + update > 0.0 {
        return DriftVerdict::MinorDrift;
    }

    DriftVerdict::NoDrift
}

/// Evaluate security findings against `severity_threshold` ("high").
///
/// Critical findings always fail. High findings fail when the threshold is at
/// or below `high`; medium findings warn when it is at or below `medium`.
pub fn security_scan_verdict(ctx: &dyn ContextStore) -> ScanVerdict {
    let results = ctx.get_object("scan_results");
    let threshold = Severity::parse_threshold(&ctx.get_string("severity_threshold", "high"));

    let critical = field_f64(&results, "critical", 0.0);
    let high = field_f64(&results, "high", 0.0);
    let medium = field_f64(&results, "medium", 0.0);

    if critical > 0.0 {
        return ScanVerdict::Fail;
    }

    if high > 0.0 && threshold.index() <= Severity::High.index() {
        return ScanVerdict::Fail;
    }

    if medium > 0.0 && threshold.index() <= Severity::Medium.index() {
        return ScanVerdict::Warn;
    }

    ScanVerdict::Pass
}

/// Decide whether a pipeline may move on to its next stage.
///
/// Keys: `stage_results.tests_passed` (false), `stage_results.coverage` (0),
/// `required_coverage` (0.8), `allow_failures` (false).
pub fn pipeline_stage_gate(ctx: &dyn ContextStore) -> StageVerdict {
    let results = ctx.get_object("stage_results");
    let required_coverage = ctx.get_f64("required_coverage", 0.8);
    let allow_failures = ctx.get_bool("allow_failures", false);

    let tests_passed = field_bool(&results, "tests_passed", false);
    let coverage = field_f64(&results, "coverage", 0.0);

    if !tests_passed && !allow_failures {
        return StageVerdict::Abort;
    }

    if coverage < required_coverage {
        warn!(
            "coverage {:.1}% below required {:.1}%",
            coverage * 100.0,
            required_coverage * 100.0
        );
        return StageVerdict::Abort;
    }

    StageVerdict::Proceed
}

fn endpoint_status(entry: &serde_json::Value) -> &str {
    entry
        .as_object()
        .map(|obj| field_str(obj, "status", "unknown"))
        .unwrap_or("unknown")
}
