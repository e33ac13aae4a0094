//! Capability configuration entry points and the capability provider.

use super::settings::{
    CapabilitySettings, CicdSettings, ContainerSettings, DeploymentSafetySettings,
    InfrastructureSettings, MonitoringSettings,
};
use super::store::{self, ConfigBackend, Orchestrator, Settings};
use crate::error::{OpsError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Store typed settings through the capability config store.
pub fn configure<S: CapabilitySettings>(
    orchestrator: &mut dyn Orchestrator,
    settings: &S,
) -> ConfigBackend {
    let mut settings = settings.clone();
    settings.normalize();
    store::store(
        orchestrator,
        S::CONFIG_NAME,
        &settings.to_settings(),
        &S::default().to_settings(),
        Some(&S::legacy_target()),
    )
}

/// Read typed settings. Stored keys overlay the defaults one at a time; a key
/// whose value does not fit the settings type is dropped with a warning.
pub fn capability_settings<S: CapabilitySettings>(orchestrator: &dyn Orchestrator) -> S {
    let defaults = S::default().to_settings();
    let merged = store::load(
        orchestrator,
        S::CONFIG_NAME,
        &defaults,
        Some(&S::legacy_target()),
    );

    let mut accepted = defaults;
    for (key, value) in merged {
        if accepted.get(&key) == Some(&value) {
            continue;
        }
        let mut candidate = accepted.clone();
        candidate.insert(key.clone(), value);
        if serde_json::from_value::<S>(Value::Object(candidate.clone())).is_ok() {
            accepted = candidate;
        } else {
            warn!(
                "stored '{}' setting '{}' is malformed, using the default",
                S::CONFIG_NAME,
                key
            );
        }
    }

    serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
}

pub fn configure_deployment_safety(
    orchestrator: &mut dyn Orchestrator,
    settings: &DeploymentSafetySettings,
) -> ConfigBackend {
    configure(orchestrator, settings)
}

pub fn get_deployment_safety(orchestrator: &dyn Orchestrator) -> DeploymentSafetySettings {
    capability_settings(orchestrator)
}

pub fn configure_container_settings(
    orchestrator: &mut dyn Orchestrator,
    settings: &ContainerSettings,
) -> ConfigBackend {
    configure(orchestrator, settings)
}

pub fn get_container_settings(orchestrator: &dyn Orchestrator) -> ContainerSettings {
    capability_settings(orchestrator)
}

pub fn configure_infrastructure_settings(
    orchestrator: &mut dyn Orchestrator,
    settings: &InfrastructureSettings,
) -> ConfigBackend {
    configure(orchestrator, settings)
}

pub fn get_infrastructure_settings(orchestrator: &dyn Orchestrator) -> InfrastructureSettings {
    capability_settings(orchestrator)
}

pub fn configure_cicd_settings(
    orchestrator: &mut dyn Orchestrator,
    settings: &CicdSettings,
) -> ConfigBackend {
    configure(orchestrator, settings)
}

pub fn get_cicd_settings(orchestrator: &dyn Orchestrator) -> CicdSettings {
    capability_settings(orchestrator)
}

pub fn configure_monitoring_settings(
    orchestrator: &mut dyn Orchestrator,
    settings: &MonitoringSettings,
) -> ConfigBackend {
    configure(orchestrator, settings)
}

pub fn get_monitoring_settings(orchestrator: &dyn Orchestrator) -> MonitoringSettings {
    capability_settings(orchestrator)
}

/// Full default table keyed by config name.
pub fn default_capability_configs() -> BTreeMap<&'static str, Settings> {
    Capability::ALL
        .iter()
        .map(|capability| (capability.config_name(), capability.defaults()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Safety,
    Tool,
}

impl CapabilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityKind::Safety => "safety",
            CapabilityKind::Tool => "tool",
        }
    }
}

/// Descriptive metadata for a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub kind: CapabilityKind,
    pub tags: &'static [&'static str],
    pub dependencies: &'static [&'static str],
}

const CAPABILITY_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    DeploymentSafety,
    ContainerSettings,
    InfrastructureSettings,
    CicdSettings,
    MonitoringSettings,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::DeploymentSafety,
        Capability::ContainerSettings,
        Capability::InfrastructureSettings,
        Capability::CicdSettings,
        Capability::MonitoringSettings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::DeploymentSafety => "deployment_safety",
            Capability::ContainerSettings => "container_settings",
            Capability::InfrastructureSettings => "infrastructure_settings",
            Capability::CicdSettings => "cicd_settings",
            Capability::MonitoringSettings => "monitoring_settings",
        }
    }

    /// Accepts the capability name or its config name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.name() == name || capability.config_name() == name)
    }

    pub fn config_name(self) -> &'static str {
        match self {
            Capability::DeploymentSafety => DeploymentSafetySettings::CONFIG_NAME,
            Capability::ContainerSettings => ContainerSettings::CONFIG_NAME,
            Capability::InfrastructureSettings => InfrastructureSettings::CONFIG_NAME,
            Capability::CicdSettings => CicdSettings::CONFIG_NAME,
            Capability::MonitoringSettings => MonitoringSettings::CONFIG_NAME,
        }
    }

    pub fn defaults(self) -> Settings {
        match self {
            Capability::DeploymentSafety => DeploymentSafetySettings::default().to_settings(),
            Capability::ContainerSettings => ContainerSettings::default().to_settings(),
            Capability::InfrastructureSettings => InfrastructureSettings::default().to_settings(),
            Capability::CicdSettings => CicdSettings::default().to_settings(),
            Capability::MonitoringSettings => MonitoringSettings::default().to_settings(),
        }
    }

    pub fn metadata(self) -> CapabilityMetadata {
        let (description, kind, tags, dependencies): (
            &'static str,
            CapabilityKind,
            &'static [&'static str],
            &'static [&'static str],
        ) = match self {
            Capability::DeploymentSafety => (
                "Deployment safety rules for preventing dangerous operations",
                CapabilityKind::Safety,
                &["safety", "deployment", "production"],
                &[],
            ),
            Capability::ContainerSettings => (
                "Container management and configuration",
                CapabilityKind::Tool,
                &["docker", "container", "podman"],
                &[],
            ),
            Capability::InfrastructureSettings => (
                "Infrastructure as Code configuration",
                CapabilityKind::Tool,
                &["terraform", "iac", "infrastructure"],
                &[],
            ),
            Capability::CicdSettings => (
                "CI/CD pipeline configuration",
                CapabilityKind::Tool,
                &["cicd", "pipeline", "automation"],
                &[],
            ),
            Capability::MonitoringSettings => (
                "Monitoring and observability configuration",
                CapabilityKind::Tool,
                &["monitoring", "observability", "metrics", "logging"],
                &["deployment_safety"],
            ),
        };
        CapabilityMetadata {
            name: self.name(),
            description,
            version: CAPABILITY_VERSION,
            kind,
            tags,
            dependencies,
        }
    }

    /// Store `overrides` layered over this capability's defaults.
    pub fn apply(
        self,
        orchestrator: &mut dyn Orchestrator,
        overrides: &Settings,
    ) -> Result<ConfigBackend> {
        match self {
            Capability::DeploymentSafety => {
                apply_typed::<DeploymentSafetySettings>(orchestrator, overrides)
            }
            Capability::ContainerSettings => {
                apply_typed::<ContainerSettings>(orchestrator, overrides)
            }
            Capability::InfrastructureSettings => {
                apply_typed::<InfrastructureSettings>(orchestrator, overrides)
            }
            Capability::CicdSettings => apply_typed::<CicdSettings>(orchestrator, overrides),
            Capability::MonitoringSettings => {
                apply_typed::<MonitoringSettings>(orchestrator, overrides)
            }
        }
    }

    /// Current settings as a JSON object (stored values over defaults).
    pub fn current(self, orchestrator: &dyn Orchestrator) -> Settings {
        match self {
            Capability::DeploymentSafety => get_deployment_safety(orchestrator).to_settings(),
            Capability::ContainerSettings => get_container_settings(orchestrator).to_settings(),
            Capability::InfrastructureSettings => {
                get_infrastructure_settings(orchestrator).to_settings()
            }
            Capability::CicdSettings => get_cicd_settings(orchestrator).to_settings(),
            Capability::MonitoringSettings => get_monitoring_settings(orchestrator).to_settings(),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn apply_typed<S: CapabilitySettings>(
    orchestrator: &mut dyn Orchestrator,
    overrides: &Settings,
) -> Result<ConfigBackend> {
    let defaults = S::default().to_settings();
    if let Some(unknown) = overrides.keys().find(|key| !defaults.contains_key(*key)) {
        return Err(OpsError::UserError(format!(
            "unknown setting '{}' for '{}'",
            unknown,
            S::CONFIG_NAME
        )));
    }
    let merged = store::merge_settings(&defaults, overrides);
    let typed: S = serde_json::from_value(Value::Object(merged)).map_err(|e| {
        OpsError::UserError(format!("invalid settings for '{}': {}", S::CONFIG_NAME, e))
    })?;
    Ok(configure(orchestrator, &typed))
}

pub fn lookup_capability(name: &str) -> Result<Capability> {
    Capability::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Capability::ALL.iter().map(|c| c.name()).collect();
        OpsError::UserError(format!(
            "unknown capability '{}'\nKnown capabilities: {}",
            name,
            known.join(", ")
        ))
    })
}

/// Applies capabilities to an orchestrator and tracks which were applied.
#[derive(Debug, Clone, Default)]
pub struct CapabilityProvider {
    applied: BTreeSet<Capability>,
}

impl CapabilityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capabilities(&self) -> Vec<CapabilityMetadata> {
        Capability::ALL.iter().map(|c| c.metadata()).collect()
    }

    pub fn apply(
        &mut self,
        orchestrator: &mut dyn Orchestrator,
        capability: Capability,
        overrides: &Settings,
    ) -> Result<ConfigBackend> {
        let backend = capability.apply(orchestrator, overrides)?;
        self.applied.insert(capability);
        Ok(backend)
    }

    /// Apply every capability with its defaults.
    pub fn apply_all(&mut self, orchestrator: &mut dyn Orchestrator) -> Result<()> {
        for capability in Capability::ALL {
            self.apply(orchestrator, capability, &Settings::new())?;
        }
        Ok(())
    }

    pub fn applied(&self) -> Vec<Capability> {
        self.applied.iter().copied().collect()
    }

    pub fn is_applied(&self, capability: Capability) -> bool {
        self.applied.contains(&capability)
    }
}
