//! Orchestrator backed by the config file.

use super::model::Config;
use crate::capabilities::{
    CapabilityConfigService, InMemoryConfigService, LocalOrchestrator, Orchestrator, Settings,
};

/// Exposes `opsgate.yaml` to the capability config store.
///
/// `capability_service: true` makes the `capabilities` table reachable as a
/// config service; otherwise only the `legacy` attribute bag is visible.
/// Changes are folded back with [`FileOrchestrator::into_config`].
#[derive(Debug, Clone)]
pub struct FileOrchestrator {
    config: Config,
    inner: LocalOrchestrator,
}

impl FileOrchestrator {
    pub fn new(config: Config) -> Self {
        let mut inner = LocalOrchestrator::legacy().with_attributes(config.legacy.clone());
        if config.capability_service {
            inner = inner.with_service(InMemoryConfigService::from_configs(
                config.capabilities.clone(),
            ));
        }
        Self { config, inner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The config with every capability write applied.
    pub fn into_config(self) -> Config {
        let mut config = self.config;
        if let Some(service) = self.inner.service() {
            config.capabilities = service.configs().clone();
        }
        config.legacy = self.inner.attributes().clone();
        config
    }
}

impl Orchestrator for FileOrchestrator {
    fn config_service(&self) -> Option<&dyn CapabilityConfigService> {
        self.inner.config_service()
    }

    fn config_service_mut(&mut self) -> Option<&mut dyn CapabilityConfigService> {
        self.inner.config_service_mut()
    }

    fn attribute(&self, name: &str) -> Option<&Settings> {
        self.inner.attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: Settings) {
        self.inner.set_attribute(name, value);
    }
}
