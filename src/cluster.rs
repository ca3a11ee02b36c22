//! Cluster and host domain model consumed by the install config builder.
//!
//! These are read-only inputs supplied by the caller per invocation. Host
//! inventory arrives as the raw JSON payload collected on the host and is
//! parsed on demand.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Platform the cluster installs onto. Open for extension: adding a variant
/// here plus a provider handler is all a new platform needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    Baremetal,
    None,
}

impl Default for PlatformType {
    fn default() -> Self {
        PlatformType::Baremetal
    }
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformType::Baremetal => write!(f, "baremetal"),
            PlatformType::None => write!(f, "none"),
        }
    }
}

/// High-availability mode. `None` is the single-node topology: one host acts
/// as both control plane and bootstrap node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighAvailabilityMode {
    Full,
    None,
}

impl Default for HighAvailabilityMode {
    fn default() -> Self {
        HighAvailabilityMode::Full
    }
}

/// Hyperthreading policy requested for the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HyperthreadingPolicy {
    None,
    All,
    Workers,
    Masters,
}

impl Default for HyperthreadingPolicy {
    fn default() -> Self {
        HyperthreadingPolicy::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostRole {
    Master,
    Worker,
}

impl Default for HostRole {
    fn default() -> Self {
        HostRole::Worker
    }
}

/// A cluster network entry: CIDR plus the prefix length allocated to each
/// node out of that block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterNetwork {
    pub cidr: String,
    pub host_prefix: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceNetwork {
    pub cidr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineNetwork {
    pub cidr: String,
}

/// Cluster state the builder reads. Network lists are ordered and may contain
/// duplicates; the builder never sorts or de-duplicates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSpec {
    pub id: String,
    pub openshift_version: String,
    pub name: String,
    pub base_dns_domain: String,
    pub cluster_networks: Vec<ClusterNetwork>,
    pub service_networks: Vec<ServiceNetwork>,
    pub machine_networks: Vec<MachineNetwork>,
    pub api_vip: String,
    pub ingress_vip: String,
    pub http_proxy: String,
    pub https_proxy: String,
    /// Raw comma-separated no-proxy string as supplied by the user.
    pub no_proxy: String,
    pub platform: PlatformType,
    pub user_managed_networking: bool,
    pub high_availability_mode: HighAvailabilityMode,
    pub hyperthreading: HyperthreadingPolicy,
    /// Network plugin; the builder falls back to a default when unset.
    pub network_type: Option<String>,
    /// Opaque JSON override patch, may be empty.
    pub install_config_overrides: String,
    pub hosts: Vec<HostSpec>,
}

impl ClusterSpec {
    #[must_use]
    pub fn is_single_node(&self) -> bool {
        self.high_availability_mode == HighAvailabilityMode::None
    }

    /// At most one host carries the bootstrap flag in single-node mode.
    #[must_use]
    pub fn bootstrap_host(&self) -> Option<&HostSpec> {
        self.hosts.iter().find(|host| host.bootstrap)
    }

    #[must_use]
    pub fn count_hosts_with_role(&self, role: HostRole) -> usize {
        self.hosts.iter().filter(|host| host.role == role).count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSpec {
    pub role: HostRole,
    pub bootstrap: bool,
    /// Target disk for bootstrap-in-place; only read for the bootstrap host
    /// of a single-node cluster.
    pub installation_disk_path: String,
    /// Raw inventory JSON as collected from the host agent.
    pub inventory: String,
}

impl HostSpec {
    /// Parses the raw inventory payload.
    pub fn parsed_inventory(&self) -> Result<Inventory> {
        serde_json::from_str(&self.inventory).map_err(|err| ConfigError::InvalidInventory {
            reason: err.to_string(),
        })
    }
}

/// Inventory payload reported by a host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub hostname: String,
    pub boot: Option<Boot>,
    pub interfaces: Vec<Interface>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Boot {
    pub current_boot_mode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    pub ipv4_addresses: Vec<String>,
    pub ipv6_addresses: Vec<String>,
    pub mac_address: String,
}
