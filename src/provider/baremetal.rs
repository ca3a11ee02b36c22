use crate::cluster::{ClusterSpec, PlatformType};
use crate::config::{BaremetalPlatform, InstallerConfig, Platform};
use crate::error::Result;
use crate::provider::Provider;

/// Bare-metal platform: API and ingress VIPs come straight from the cluster.
pub struct BaremetalProvider;

impl Provider for BaremetalProvider {
    fn platform_type(&self) -> PlatformType {
        PlatformType::Baremetal
    }

    fn add_platform_to_install_config(
        &self,
        cfg: &mut InstallerConfig,
        cluster: &ClusterSpec,
    ) -> Result<()> {
        cfg.platform = Platform {
            baremetal: Some(BaremetalPlatform {
                api_vip: cluster.api_vip.clone(),
                ingress_vip: cluster.ingress_vip.clone(),
            }),
            none: None,
        };
        Ok(())
    }
}
