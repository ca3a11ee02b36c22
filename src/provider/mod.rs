//! Platform dispatch.
//!
//! Each platform ships one [`Provider`] handler; the registry maps the
//! cluster's platform type to its handler. Supporting a new platform means
//! registering another handler, nothing in the dispatch changes.

mod baremetal;
mod none;

pub use baremetal::BaremetalProvider;
pub use none::NoneProvider;

use std::collections::HashMap;

use crate::cluster::{ClusterSpec, PlatformType};
use crate::config::InstallerConfig;
use crate::error::{ConfigError, Result};

/// Platform-specific install config population.
pub trait Provider: Send + Sync {
    /// Platform this handler serves.
    fn platform_type(&self) -> PlatformType;

    /// Fills in the platform block and any platform-coupled fields.
    fn add_platform_to_install_config(
        &self,
        cfg: &mut InstallerConfig,
        cluster: &ClusterSpec,
    ) -> Result<()>;
}

pub struct ProviderRegistry {
    providers: HashMap<PlatformType, Box<dyn Provider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.insert(provider.platform_type(), provider);
    }

    /// Dispatches to the handler registered for `platform`.
    pub fn add_platform_to_install_config(
        &self,
        platform: PlatformType,
        cfg: &mut InstallerConfig,
        cluster: &ClusterSpec,
    ) -> Result<()> {
        let provider =
            self.providers
                .get(&platform)
                .ok_or_else(|| ConfigError::UnsupportedPlatform {
                    platform: platform.to_string(),
                })?;
        provider.add_platform_to_install_config(cfg, cluster)
    }
}

impl Default for ProviderRegistry {
    /// Registry with all built-in platform handlers.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(BaremetalProvider));
        registry.register(Box::new(NoneProvider));
        registry
    }
}
