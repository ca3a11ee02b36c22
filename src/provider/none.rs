use crate::cluster::{ClusterSpec, PlatformType};
use crate::config::{BootstrapInPlace, InstallerConfig, Platform, PlatformNone};
use crate::error::Result;
use crate::provider::Provider;

/// Platform "none": no VIPs. For single-node clusters with a bootstrap host
/// the installer additionally gets a bootstrap-in-place block pointing at
/// that host's installation disk.
pub struct NoneProvider;

impl Provider for NoneProvider {
    fn platform_type(&self) -> PlatformType {
        PlatformType::None
    }

    fn add_platform_to_install_config(
        &self,
        cfg: &mut InstallerConfig,
        cluster: &ClusterSpec,
    ) -> Result<()> {
        cfg.platform = Platform {
            baremetal: None,
            none: Some(PlatformNone {}),
        };

        cfg.bootstrap_in_place = None;
        if cluster.is_single_node() {
            if let Some(bootstrap) = cluster.bootstrap_host() {
                cfg.bootstrap_in_place = Some(BootstrapInPlace {
                    installation_disk: bootstrap.installation_disk_path.clone(),
                });
            }
        }
        Ok(())
    }
}
