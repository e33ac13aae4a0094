//! Dual-backend capability settings storage.
//!
//! Settings live either in a config service exposed by the orchestrator or,
//! when no service is reachable, in a legacy attribute on the orchestrator
//! itself. Each call probes once and touches exactly one backend.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A settings bundle as stored by either backend.
pub type Settings = Map<String, Value>;

/// A typed config service reachable through the orchestrator.
pub trait CapabilityConfigService {
    fn get_config(&self, name: &str) -> Option<Settings>;
    fn set_config(&mut self, name: &str, settings: Settings);
}

/// Config service backed by an in-memory map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryConfigService {
    configs: BTreeMap<String, Settings>,
}

impl InMemoryConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: BTreeMap<String, Settings>) -> Self {
        Self { configs }
    }

    pub fn configs(&self) -> &BTreeMap<String, Settings> {
        &self.configs
    }

    pub fn into_configs(self) -> BTreeMap<String, Settings> {
        self.configs
    }
}

impl CapabilityConfigService for InMemoryConfigService {
    fn get_config(&self, name: &str) -> Option<Settings> {
        self.configs.get(name).cloned()
    }

    fn set_config(&mut self, name: &str, settings: Settings) {
        self.configs.insert(name.to_string(), settings);
    }
}

/// The host object capability settings are attached to.
pub trait Orchestrator {
    /// Service locator probe.
    fn config_service(&self) -> Option<&dyn CapabilityConfigService>;

    fn config_service_mut(&mut self) -> Option<&mut dyn CapabilityConfigService>;

    /// Legacy attribute bag lookup.
    fn attribute(&self, name: &str) -> Option<&Settings>;

    fn set_attribute(&mut self, name: &str, value: Settings);
}

/// Where a capability lives in the legacy attribute bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTarget {
    pub attribute: String,
    /// Key inside the attribute holding the settings, if nested.
    pub key: Option<String>,
}

impl LegacyTarget {
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            attribute: name.into(),
            key: None,
        }
    }

    pub fn nested(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            attribute: name.into(),
            key: Some(key.into()),
        }
    }

    fn read(&self, orchestrator: &dyn Orchestrator) -> Option<Settings> {
        let attribute = orchestrator.attribute(&self.attribute)?;
        match &self.key {
            None => Some(attribute.clone()),
            Some(key) => match attribute.get(key) {
                Some(Value::Object(map)) => Some(map.clone()),
                _ => None,
            },
        }
    }

    fn write(&self, orchestrator: &mut dyn Orchestrator, settings: Settings) {
        let value = match &self.key {
            None => settings,
            Some(key) => {
                let mut attribute = orchestrator
                    .attribute(&self.attribute)
                    .cloned()
                    .unwrap_or_default();
                attribute.insert(key.clone(), Value::Object(settings));
                attribute
            }
        };
        orchestrator.set_attribute(&self.attribute, value);
    }
}

/// Which storage backend a call goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigBackend {
    ServiceBacked,
    AttributeBacked,
}

/// Precedence policy: a reachable service always wins.
pub fn select_backend(service_available: bool) -> ConfigBackend {
    if service_available {
        ConfigBackend::ServiceBacked
    } else {
        ConfigBackend::AttributeBacked
    }
}

impl ConfigBackend {
    /// Probe the orchestrator and pick the backend for this call.
    pub fn probe(orchestrator: &dyn Orchestrator) -> Self {
        select_backend(orchestrator.config_service().is_some())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigBackend::ServiceBacked => "service",
            ConfigBackend::AttributeBacked => "attribute",
        }
    }
}

impl std::fmt::Display for ConfigBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overlay `overrides` on top of `defaults`.
pub fn merge_settings(defaults: &Settings, overrides: &Settings) -> Settings {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Store settings for a capability.
///
/// The service receives `settings` as given. The legacy attribute receives
/// `defaults` merged with `settings`. `fallback` names the legacy home; when
/// absent an attribute named after the capability is used.
pub fn store(
    orchestrator: &mut dyn Orchestrator,
    name: &str,
    settings: &Settings,
    defaults: &Settings,
    fallback: Option<&LegacyTarget>,
) -> ConfigBackend {
    let backend = ConfigBackend::probe(orchestrator);
    match backend {
        ConfigBackend::ServiceBacked => {
            if let Some(service) = orchestrator.config_service_mut() {
                service.set_config(name, settings.clone());
            }
        }
        ConfigBackend::AttributeBacked => {
            let target = fallback
                .cloned()
                .unwrap_or_else(|| LegacyTarget::attribute(name));
            target.write(orchestrator, merge_settings(defaults, settings));
        }
    }
    info!("stored capability config '{}' via {} backend", name, backend);
    backend
}

/// Load settings for a capability, with `defaults` under anything stored.
pub fn load(
    orchestrator: &dyn Orchestrator,
    name: &str,
    defaults: &Settings,
    fallback: Option<&LegacyTarget>,
) -> Settings {
    let backend = ConfigBackend::probe(orchestrator);
    let stored = match backend {
        ConfigBackend::ServiceBacked => orchestrator
            .config_service()
            .and_then(|service| service.get_config(name)),
        ConfigBackend::AttributeBacked => match fallback {
            Some(target) => target.read(orchestrator),
            None => LegacyTarget::attribute(name).read(orchestrator),
        },
    };
    match stored {
        Some(stored) => merge_settings(defaults, &stored),
        None => {
            debug!("no stored config for '{}' ({} backend)", name, backend);
            defaults.clone()
        }
    }
}

/// An orchestrator holding an optional in-memory service and an attribute bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalOrchestrator {
    service: Option<InMemoryConfigService>,
    attributes: BTreeMap<String, Settings>,
}

impl LocalOrchestrator {
    /// Orchestrator exposing an empty config service.
    pub fn service_backed() -> Self {
        Self {
            service: Some(InMemoryConfigService::new()),
            attributes: BTreeMap::new(),
        }
    }

    /// Orchestrator without a config service.
    pub fn legacy() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: InMemoryConfigService) -> Self {
        self.service = Some(service);
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, Settings>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn service(&self) -> Option<&InMemoryConfigService> {
        self.service.as_ref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, Settings> {
        &self.attributes
    }
}

impl Orchestrator for LocalOrchestrator {
    fn config_service(&self) -> Option<&dyn CapabilityConfigService> {
        self.service
            .as_ref()
            .map(|service| service as &dyn CapabilityConfigService)
    }

    fn config_service_mut(&mut self) -> Option<&mut dyn CapabilityConfigService> {
        self.service
            .as_mut()
            .map(|service| service as &mut dyn CapabilityConfigService)
    }

    fn attribute(&self, name: &str) -> Option<&Settings> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: Settings) {
        self.attributes.insert(name.to_string(), value);
    }
}
