//! Install config assembly pipeline.
//!
//! Base document -> network derivation -> platform dispatch -> user override
//! merge -> trust bundle composition -> YAML. Each invocation is a pure
//! function of the cluster model and the collaborators' current answers; the
//! builder holds no mutable state between calls.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::cluster::{ClusterSpec, HostRole, HyperthreadingPolicy};
use crate::config::{
    ClusterNetworkEntry, HyperthreadingSetting, ImageContentSource, InstallerConfig,
    MachineNetworkEntry, MachinePool, Metadata, Networking, Proxy, DEFAULT_NETWORK_TYPE,
    INSTALL_CONFIG_API_VERSION,
};
use crate::error::{ConfigError, Result};
use crate::mirror::MirrorRegistriesConfig;
use crate::network;
use crate::provider::ProviderRegistry;

const PEM_BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

pub struct InstallConfigBuilder {
    mirror_registries: Arc<dyn MirrorRegistriesConfig>,
    provider_registry: ProviderRegistry,
}

impl InstallConfigBuilder {
    pub fn new(
        mirror_registries: Arc<dyn MirrorRegistriesConfig>,
        provider_registry: ProviderRegistry,
    ) -> Self {
        Self {
            mirror_registries,
            provider_registry,
        }
    }

    /// Produces the serialized install configuration document for `cluster`.
    ///
    /// `include_trust_bundle` requests the explicit `ca` in the document's
    /// trust bundle; mirror-registry CA material takes precedence over it
    /// whenever mirrors are configured.
    pub fn get_install_config(
        &self,
        cluster: &ClusterSpec,
        include_trust_bundle: bool,
        ca: &str,
    ) -> Result<Vec<u8>> {
        let cfg = self.build(cluster, include_trust_bundle, ca)?;
        let yaml = serde_yaml::to_string(&cfg)?;
        Ok(yaml.into_bytes())
    }

    /// Pre-flight validation of a user-submitted override patch: runs the
    /// full build pipeline against `cluster` with `patch` layered on top and
    /// discards the document.
    pub fn validate_install_config_patch(&self, cluster: &ClusterSpec, patch: &str) -> Result<()> {
        let mut cluster = cluster.clone();
        cluster.install_config_overrides = patch.to_string();
        self.build(&cluster, false, "").map(|_| ())
    }

    fn build(
        &self,
        cluster: &ClusterSpec,
        include_trust_bundle: bool,
        ca: &str,
    ) -> Result<InstallerConfig> {
        let mut cfg = self.base_config(cluster)?;
        self.provider_registry
            .add_platform_to_install_config(cluster.platform, &mut cfg, cluster)?;
        self.apply_config_overrides(&cluster.install_config_overrides, &mut cfg)?;
        self.apply_trust_bundle(&mut cfg, include_trust_bundle, ca)?;

        info!(
            cluster = %cluster.name,
            platform = %cluster.platform,
            "assembled install config"
        );
        Ok(cfg)
    }

    /// Default document skeleton derived from the cluster model alone.
    fn base_config(&self, cluster: &ClusterSpec) -> Result<InstallerConfig> {
        let network_type = cluster
            .network_type
            .clone()
            .unwrap_or_else(|| DEFAULT_NETWORK_TYPE.to_string());

        let machine_networks = network::machine_networks_for_cluster(cluster)?;
        let machine_network = if machine_networks.is_empty() {
            None
        } else {
            Some(
                machine_networks
                    .into_iter()
                    .map(|cidr| MachineNetworkEntry { cidr })
                    .collect(),
            )
        };

        let (control_plane_ht, compute_ht) = hyperthreading_settings(cluster.hyperthreading);

        let mut cfg = InstallerConfig {
            api_version: INSTALL_CONFIG_API_VERSION.to_string(),
            base_domain: cluster.base_dns_domain.clone(),
            networking: Networking {
                network_type,
                cluster_network: cluster
                    .cluster_networks
                    .iter()
                    .map(|net| ClusterNetworkEntry {
                        cidr: net.cidr.clone(),
                        host_prefix: net.host_prefix,
                    })
                    .collect(),
                machine_network,
                service_network: cluster
                    .service_networks
                    .iter()
                    .map(|net| net.cidr.clone())
                    .collect(),
            },
            metadata: Metadata {
                name: cluster.name.clone(),
            },
            control_plane: MachinePool {
                hyperthreading: control_plane_ht,
                name: "master".to_string(),
                replicas: cluster.count_hosts_with_role(HostRole::Master),
            },
            compute: vec![MachinePool {
                hyperthreading: compute_ht,
                name: "worker".to_string(),
                replicas: cluster.count_hosts_with_role(HostRole::Worker),
            }],
            ..InstallerConfig::default()
        };

        if !cluster.http_proxy.is_empty() || !cluster.https_proxy.is_empty() {
            cfg.proxy = Some(Proxy {
                http_proxy: cluster.http_proxy.clone(),
                https_proxy: cluster.https_proxy.clone(),
                no_proxy: self.generate_no_proxy(cluster),
            });
        }

        if self.mirror_registries.is_mirror_registries_configured() {
            let pairs = self.mirror_registries.extract_location_mirror_pairs()?;
            cfg.image_content_sources = Some(
                pairs
                    .into_iter()
                    .map(|pair| ImageContentSource {
                        source: pair.location,
                        mirrors: vec![pair.mirror],
                    })
                    .collect(),
            );
        }

        Ok(cfg)
    }

    /// Builds the proxy-exclusion list for `cluster`.
    ///
    /// A trimmed value of `*` disables proxy exceptions globally and is
    /// returned verbatim. Otherwise the user's entries (input order) are
    /// followed by the cluster's internal wildcard domain, the cluster
    /// network CIDRs, the service network CIDRs and the primary machine
    /// network CIDR. Nothing is de-duplicated.
    #[must_use]
    pub fn generate_no_proxy(&self, cluster: &ClusterSpec) -> String {
        let user_no_proxy = cluster.no_proxy.trim();
        if user_no_proxy == "*" {
            return "*".to_string();
        }

        let mut entries: Vec<String> = Vec::new();
        if !user_no_proxy.is_empty() {
            entries.extend(
                user_no_proxy
                    .split(',')
                    .map(|entry| entry.trim().to_string()),
            );
        }

        entries.push(format!(".{}.{}", cluster.name, cluster.base_dns_domain));
        entries.extend(cluster.cluster_networks.iter().map(|net| net.cidr.clone()));
        entries.extend(cluster.service_networks.iter().map(|net| net.cidr.clone()));

        // Only the primary machine network, explicit or derived.
        let primary = network::machine_cidr_at(cluster, 0)
            .map(ToString::to_string)
            .or_else(|| {
                network::machine_networks_for_cluster(cluster)
                    .ok()
                    .and_then(|cidrs| cidrs.into_iter().next())
            });
        if let Some(cidr) = primary {
            entries.push(cidr);
        }

        let no_proxy = entries.join(",");
        debug!(cluster = %cluster.name, %no_proxy, "computed proxy exclusions");
        no_proxy
    }

    /// Applies the user's JSON override patch onto the assembled document.
    ///
    /// Objects merge key-wise, scalars and sequences replace wholesale. The
    /// merged value is re-deserialized into the typed document, so unknown
    /// field names and type mismatches are rejected rather than ignored.
    fn apply_config_overrides(&self, overrides: &str, cfg: &mut InstallerConfig) -> Result<()> {
        if overrides.is_empty() {
            return Ok(());
        }

        let patch: Value =
            serde_json::from_str(overrides).map_err(|err| ConfigError::InvalidOverrides {
                reason: err.to_string(),
            })?;
        if !patch.is_object() {
            return Err(ConfigError::schema("override patch must be a JSON object"));
        }

        let mut merged =
            serde_json::to_value(&*cfg).map_err(|err| ConfigError::schema(err.to_string()))?;
        merge_values(&mut merged, patch);

        *cfg = serde_json::from_value(merged)
            .map_err(|err| ConfigError::schema(err.to_string()))?;

        if let Some(bundle) = cfg.additional_trust_bundle.as_deref() {
            validate_pem_bundle(bundle)?;
        }
        Ok(())
    }

    /// Composes the trust bundle after the override merge.
    ///
    /// An override-supplied bundle is layered after the computed base with a
    /// newline separator, never dropped and never allowed to drop the base.
    fn apply_trust_bundle(
        &self,
        cfg: &mut InstallerConfig,
        include_trust_bundle: bool,
        ca: &str,
    ) -> Result<()> {
        let Some(base) = self.ca_contents(include_trust_bundle, ca)? else {
            return Ok(());
        };
        cfg.additional_trust_bundle = Some(match cfg.additional_trust_bundle.take() {
            Some(existing) => format!("{base}\n{existing}"),
            None => base,
        });
        Ok(())
    }

    /// Base trust-bundle text. Mirror-registry CA takes precedence over the
    /// explicit CA and is included whenever mirrors are configured; the
    /// explicit CA only appears when requested and no mirrors exist.
    fn ca_contents(&self, include_trust_bundle: bool, ca: &str) -> Result<Option<String>> {
        if self.mirror_registries.is_mirror_registries_configured() {
            let mirror_ca = self.mirror_registries.mirror_ca()?;
            let text = String::from_utf8_lossy(&mirror_ca);
            return Ok(Some(format!(" | \n{text}")));
        }
        if include_trust_bundle {
            return Ok(Some(format!(" | {ca}")));
        }
        Ok(None)
    }
}

/// Hyperthreading policy table: per-role document settings.
fn hyperthreading_settings(
    policy: HyperthreadingPolicy,
) -> (HyperthreadingSetting, HyperthreadingSetting) {
    match policy {
        HyperthreadingPolicy::None => {
            (HyperthreadingSetting::Disabled, HyperthreadingSetting::Disabled)
        }
        HyperthreadingPolicy::All => {
            (HyperthreadingSetting::Enabled, HyperthreadingSetting::Enabled)
        }
        HyperthreadingPolicy::Workers => {
            (HyperthreadingSetting::Disabled, HyperthreadingSetting::Enabled)
        }
        HyperthreadingPolicy::Masters => {
            (HyperthreadingSetting::Enabled, HyperthreadingSetting::Disabled)
        }
    }
}

/// Recursive structural merge: objects merge key-wise, everything else
/// replaces the base value wholesale.
fn merge_values(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, patch) => *base_slot = patch,
    }
}

/// Structural PEM check for override-supplied bundles: at least one complete
/// certificate block, and balanced BEGIN/END markers.
fn validate_pem_bundle(bundle: &str) -> Result<()> {
    let begins = bundle.matches(PEM_BEGIN_CERTIFICATE).count();
    let ends = bundle.matches(PEM_END_CERTIFICATE).count();
    if begins == 0 || begins != ends {
        return Err(ConfigError::schema(
            "additionalTrustBundle is not a valid PEM certificate bundle",
        ));
    }
    Ok(())
}
