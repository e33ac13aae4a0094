//! Typed capability settings and their default tables.

use super::store::{LegacyTarget, Settings};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A settings bundle that can be stored through the capability config store.
pub trait CapabilitySettings: Serialize + DeserializeOwned + Default + Clone {
    /// Key under which the service-backed store keeps these settings.
    const CONFIG_NAME: &'static str;

    /// Where the legacy attribute fallback keeps these settings.
    fn legacy_target() -> LegacyTarget;

    /// Fill in values that must never be stored empty.
    fn normalize(&mut self) {}

    /// Settings as a JSON object.
    fn to_settings(&self) -> Settings {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Settings::new(),
        }
    }
}

/// Deployment safety rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSafetySettings {
    pub require_approval_for_production: bool,
    pub require_backup_before_deploy: bool,
    pub enable_rollback: bool,
    pub protected_environments: Vec<String>,
}

impl Default for DeploymentSafetySettings {
    fn default() -> Self {
        Self {
            require_approval_for_production: true,
            require_backup_before_deploy: true,
            enable_rollback: true,
            protected_environments: vec!["production".to_string(), "staging".to_string()],
        }
    }
}

impl CapabilitySettings for DeploymentSafetySettings {
    const CONFIG_NAME: &'static str = "deployment_safety";

    fn legacy_target() -> LegacyTarget {
        LegacyTarget::nested("safety_config", "deployment")
    }

    /// An empty protected list means the default list.
    fn normalize(&mut self) {
        if self.protected_environments.is_empty() {
            self.protected_environments = Self::default().protected_environments;
        }
    }
}

/// Container runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Container CLI, e.g. `docker` or `podman`.
    pub runtime: String,
    pub default_registry: Option<String>,
    pub security_scan_enabled: bool,
    pub max_image_size_mb: u64,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            default_registry: None,
            security_scan_enabled: true,
            max_image_size_mb: 2000,
        }
    }
}

impl CapabilitySettings for ContainerSettings {
    const CONFIG_NAME: &'static str = "container_config";

    fn legacy_target() -> LegacyTarget {
        LegacyTarget::attribute(Self::CONFIG_NAME)
    }
}

/// Infrastructure-as-Code settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfrastructureSettings {
    /// IaC tool, e.g. `terraform` or `opentofu`.
    pub iac_tool: String,
    pub auto_approve_non_destructive: bool,
    pub require_plan_before_apply: bool,
    pub state_backend: Option<String>,
}

impl Default for InfrastructureSettings {
    fn default() -> Self {
        Self {
            iac_tool: "terraform".to_string(),
            auto_approve_non_destructive: false,
            require_plan_before_apply: true,
            state_backend: None,
        }
    }
}

impl CapabilitySettings for InfrastructureSettings {
    const CONFIG_NAME: &'static str = "infrastructure_config";

    fn legacy_target() -> LegacyTarget {
        LegacyTarget::attribute("infra_config")
    }
}

/// CI/CD pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CicdSettings {
    pub platform: String,
    pub run_tests_before_deploy: bool,
    pub require_passing_checks: bool,
    pub enable_security_scan: bool,
}

impl Default for CicdSettings {
    fn default() -> Self {
        Self {
            platform: "github_actions".to_string(),
            run_tests_before_deploy: true,
            require_passing_checks: true,
            enable_security_scan: true,
        }
    }
}

impl CapabilitySettings for CicdSettings {
    const CONFIG_NAME: &'static str = "cicd_config";

    fn legacy_target() -> LegacyTarget {
        LegacyTarget::attribute(Self::CONFIG_NAME)
    }
}

/// Monitoring and observability settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    pub metrics_backend: String,
    pub logging_backend: String,
    pub alerting_enabled: bool,
    pub dashboard_tool: String,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            metrics_backend: "prometheus".to_string(),
            logging_backend: "loki".to_string(),
            alerting_enabled: true,
            dashboard_tool: "grafana".to_string(),
        }
    }
}

impl CapabilitySettings for MonitoringSettings {
    const CONFIG_NAME: &'static str = "monitoring_config";

    fn legacy_target() -> LegacyTarget {
        LegacyTarget::attribute(Self::CONFIG_NAME)
    }
}
