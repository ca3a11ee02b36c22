//! Network topology helpers for the install config builder.

use ipnet::IpNet;

use crate::cluster::{ClusterSpec, PlatformType};
use crate::error::{ConfigError, Result};

/// Machine network CIDR at `index`, as configured on the cluster.
#[must_use]
pub fn machine_cidr_at(cluster: &ClusterSpec, index: usize) -> Option<&str> {
    cluster
        .machine_networks
        .get(index)
        .map(|net| net.cidr.as_str())
}

/// Containing network of a host address, e.g. `1.2.3.1/24` -> `1.2.3.0/24`.
pub fn network_of(address: &str) -> Result<String> {
    let net: IpNet = address.parse().map_err(|err| ConfigError::InvalidCidr {
        cidr: address.to_string(),
        reason: format!("{err}"),
    })?;
    Ok(net.trunc().to_string())
}

/// Machine networks for the install document, preserving input order and
/// cardinality.
///
/// "None"-platform clusters may omit explicit machine networks and rely on
/// auto-discovery from the single bootstrap node: in that case the list is
/// derived from the bootstrap host's first interface, IPv4 before IPv6
/// regardless of inventory order. Without a bootstrap host (or without any
/// address on its first interface) the list stays empty.
pub fn machine_networks_for_cluster(cluster: &ClusterSpec) -> Result<Vec<String>> {
    if cluster.platform != PlatformType::None || !cluster.machine_networks.is_empty() {
        return Ok(cluster
            .machine_networks
            .iter()
            .map(|net| net.cidr.clone())
            .collect());
    }

    let Some(bootstrap) = cluster.bootstrap_host() else {
        return Ok(Vec::new());
    };
    let inventory = bootstrap.parsed_inventory()?;
    let Some(nic) = inventory.interfaces.first() else {
        return Ok(Vec::new());
    };

    let mut cidrs = Vec::new();
    if let Some(address) = nic.ipv4_addresses.first() {
        cidrs.push(network_of(address)?);
    }
    if let Some(address) = nic.ipv6_addresses.first() {
        cidrs.push(network_of(address)?);
    }
    Ok(cidrs)
}
