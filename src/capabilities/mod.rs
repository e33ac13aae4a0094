//! Capability settings: typed bundles, dual-backend storage, and the provider.

mod provider;
mod settings;
mod store;

#[cfg(test)]
mod tests;

pub use provider::{
    Capability, CapabilityKind, CapabilityMetadata, CapabilityProvider, capability_settings,
    configure, configure_cicd_settings, configure_container_settings, configure_deployment_safety,
    configure_infrastructure_settings, configure_monitoring_settings, default_capability_configs,
    get_cicd_settings, get_container_settings, get_deployment_safety, get_infrastructure_settings,
    get_monitoring_settings, lookup_capability,
};
pub use settings::{
    CapabilitySettings, CicdSettings, ContainerSettings, DeploymentSafetySettings,
    InfrastructureSettings, MonitoringSettings,
};
pub use store::{
    CapabilityConfigService, ConfigBackend, InMemoryConfigService, LegacyTarget,
    LocalOrchestrator, Orchestrator, Settings, load, merge_settings, select_backend, store,
};
