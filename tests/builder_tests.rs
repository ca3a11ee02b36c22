//! End-to-end tests for the install config pipeline.
//!
//! These drive the public API with a stub mirror-registry collaborator and
//! assert on the YAML document the way the downstream installer would see it.

use std::sync::Arc;

use installcfg::cluster::{
    ClusterNetwork, ClusterSpec, HighAvailabilityMode, HostRole, HostSpec, MachineNetwork,
    PlatformType, ServiceNetwork,
};
use installcfg::config::PlatformNone;
use installcfg::{
    ConfigError, InstallConfigBuilder, InstallerConfig, MirrorRegistriesConfig,
    ProviderRegistry, RegistryMirrorPair,
};

const MIRROR_CA: &str =
    "-----BEGIN CERTIFICATE-----\nmirror cert body\n-----END CERTIFICATE-----";
const USER_CA: &str = "-----BEGIN CERTIFICATE-----\nuser cert body\n-----END CERTIFICATE-----";

struct StubMirrorRegistries {
    configured: bool,
    pairs: Vec<RegistryMirrorPair>,
}

impl StubMirrorRegistries {
    fn unconfigured() -> Self {
        Self {
            configured: false,
            pairs: Vec::new(),
        }
    }

    fn configured() -> Self {
        Self {
            configured: true,
            pairs: vec![RegistryMirrorPair {
                location: "quay.io/release".to_string(),
                mirror: "registry.local:5000/release".to_string(),
            }],
        }
    }
}

impl MirrorRegistriesConfig for StubMirrorRegistries {
    fn is_mirror_registries_configured(&self) -> bool {
        self.configured
    }

    fn extract_location_mirror_pairs(&self) -> installcfg::Result<Vec<RegistryMirrorPair>> {
        Ok(self.pairs.clone())
    }

    fn mirror_ca(&self) -> installcfg::Result<Vec<u8>> {
        if self.configured {
            Ok(MIRROR_CA.as_bytes().to_vec())
        } else {
            Err(ConfigError::MirrorRegistries {
                reason: "not configured".to_string(),
            })
        }
    }
}

fn builder(mirror: StubMirrorRegistries) -> InstallConfigBuilder {
    InstallConfigBuilder::new(Arc::new(mirror), ProviderRegistry::default())
}

fn inventory_json(ipv4: bool, ipv6: bool) -> String {
    let ipv4_addresses: Vec<&str> = if ipv4 { vec!["1.2.3.1/24"] } else { vec![] };
    let ipv6_addresses: Vec<&str> = if ipv6 { vec!["1001:db8::1/120"] } else { vec![] };
    serde_json::json!({
        "hostname": "hostname0",
        "boot": {"current_boot_mode": "uefi"},
        "interfaces": [{
            "ipv4_addresses": ipv4_addresses,
            "ipv6_addresses": ipv6_addresses,
            "mac_address": "52:54:00:00:00:01"
        }]
    })
    .to_string()
}

fn baremetal_cluster() -> ClusterSpec {
    ClusterSpec {
        name: "test-cluster".to_string(),
        base_dns_domain: "example.com".to_string(),
        openshift_version: "4.8".to_string(),
        cluster_networks: vec![ClusterNetwork {
            cidr: "1.1.1.0/24".to_string(),
            host_prefix: 24,
        }],
        service_networks: vec![ServiceNetwork {
            cidr: "2.2.2.0/24".to_string(),
        }],
        machine_networks: vec![MachineNetwork {
            cidr: "1.2.3.0/24".to_string(),
        }],
        api_vip: "1.2.3.11".to_string(),
        ingress_vip: "1.2.3.12".to_string(),
        network_type: Some("OpenShiftSDN".to_string()),
        hosts: vec![
            HostSpec {
                role: HostRole::Master,
                inventory: inventory_json(true, true),
                ..HostSpec::default()
            },
            HostSpec {
                role: HostRole::Worker,
                inventory: inventory_json(true, true),
                ..HostSpec::default()
            },
        ],
        ..ClusterSpec::default()
    }
}

fn none_platform_cluster() -> ClusterSpec {
    let mut cluster = baremetal_cluster();
    cluster.platform = PlatformType::None;
    cluster.user_managed_networking = true;
    cluster
}

fn render(builder: &InstallConfigBuilder, cluster: &ClusterSpec) -> InstallerConfig {
    let data = builder.get_install_config(cluster, false, "").unwrap();
    serde_yaml::from_slice(&data).unwrap()
}

#[test]
fn baremetal_document_shape() {
    let cluster = baremetal_cluster();
    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);

    assert_eq!(result.api_version, "v1");
    assert_eq!(result.base_domain, "example.com");
    assert_eq!(result.metadata.name, "test-cluster");
    assert_eq!(result.networking.network_type, "OpenShiftSDN");
    assert_eq!(result.control_plane.name, "master");
    assert_eq!(result.control_plane.replicas, 1);
    assert_eq!(result.compute[0].name, "worker");
    assert_eq!(result.compute[0].replicas, 1);

    let baremetal = result.platform.baremetal.expect("baremetal block");
    assert_eq!(baremetal.api_vip, "1.2.3.11");
    assert_eq!(baremetal.ingress_vip, "1.2.3.12");
    assert!(result.platform.none.is_none());
    assert!(result.proxy.is_none());
    assert!(result.additional_trust_bundle.is_none());
}

#[test]
fn proxy_block_with_default_no_proxy() {
    let mut cluster = baremetal_cluster();
    cluster.http_proxy = "http://proxyserver:3218".to_string();
    cluster.https_proxy = "http://proxyserver:3218".to_string();

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    let proxy = result.proxy.expect("proxy block");
    assert_eq!(proxy.http_proxy, "http://proxyserver:3218");
    assert_eq!(proxy.https_proxy, "http://proxyserver:3218");

    let entries: Vec<&str> = proxy.no_proxy.split(',').collect();
    assert_eq!(
        entries,
        vec![
            ".test-cluster.example.com",
            "1.1.1.0/24",
            "2.2.2.0/24",
            "1.2.3.0/24"
        ]
    );
}

#[test]
fn proxy_block_keeps_user_entries_first() {
    let mut cluster = baremetal_cluster();
    cluster.http_proxy = "http://proxyserver:3218".to_string();
    cluster.https_proxy = "http://proxyserver:3218".to_string();
    cluster.no_proxy = "no-proxy.com".to_string();

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    let no_proxy = result.proxy.unwrap().no_proxy;
    assert_eq!(no_proxy.split(',').count(), 5);
    assert!(no_proxy.starts_with("no-proxy.com,"));
}

#[test]
fn none_platform_without_machine_networks_derives_dual_stack() {
    let mut cluster = none_platform_cluster();
    cluster.machine_networks = Vec::new();
    cluster.hosts[0].bootstrap = true;

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    assert!(result.platform.baremetal.is_none());
    assert_eq!(result.platform.none, Some(PlatformNone {}));

    let machine_network = result.networking.machine_network.expect("machine networks");
    assert_eq!(machine_network.len(), 2);
    assert_eq!(machine_network[0].cidr, "1.2.3.0/24");
    assert_eq!(machine_network[1].cidr, "1001:db8::/120");
}

#[test]
fn none_platform_ipv6_only_host_derives_one_network() {
    let mut cluster = none_platform_cluster();
    cluster.machine_networks = Vec::new();
    cluster.hosts[0].bootstrap = true;
    cluster.hosts[0].inventory = inventory_json(false, true);

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    let machine_network = result.networking.machine_network.expect("machine networks");
    assert_eq!(machine_network.len(), 1);
    assert_eq!(machine_network[0].cidr, "1001:db8::/120");
}

#[test]
fn single_node_gets_bootstrap_in_place() {
    let mut cluster = none_platform_cluster();
    cluster.high_availability_mode = HighAvailabilityMode::None;
    cluster.hosts[0].bootstrap = true;
    cluster.hosts[0].installation_disk_path = "/dev/test".to_string();

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    assert_eq!(result.platform.none, Some(PlatformNone {}));
    assert_eq!(
        result.bootstrap_in_place.unwrap().installation_disk,
        "/dev/test"
    );
}

#[test]
fn single_node_default_network_type() {
    let mut cluster = none_platform_cluster();
    cluster.high_availability_mode = HighAvailabilityMode::None;
    cluster.network_type = None;
    cluster.hosts[0].bootstrap = true;

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    assert_eq!(result.networking.network_type, "OVNKubernetes");
}

#[test]
fn overrides_from_cluster_spec_are_applied() {
    let mut cluster = baremetal_cluster();
    cluster.install_config_overrides = r#"{"fips":true}"#.to_string();

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    assert!(result.fips);
    assert_eq!(result.api_version, "v1");
    assert_eq!(result.base_domain, "example.com");
}

#[test]
fn explicit_ca_trust_bundle() {
    let cluster = baremetal_cluster();
    let data = builder(StubMirrorRegistries::unconfigured())
        .get_install_config(&cluster, true, USER_CA)
        .unwrap();
    let result: InstallerConfig = serde_yaml::from_slice(&data).unwrap();
    assert_eq!(
        result.additional_trust_bundle.unwrap(),
        format!(" | {USER_CA}")
    );
}

#[test]
fn mirror_registries_set_sources_and_trust_bundle() {
    let cluster = baremetal_cluster();
    let data = builder(StubMirrorRegistries::configured())
        .get_install_config(&cluster, true, USER_CA)
        .unwrap();
    let result: InstallerConfig = serde_yaml::from_slice(&data).unwrap();

    // The mirror CA wins over the explicit CA in the base computation.
    assert_eq!(
        result.additional_trust_bundle.unwrap(),
        format!(" | \n{MIRROR_CA}")
    );
    let sources = result.image_content_sources.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].source, "quay.io/release");
    assert_eq!(sources[0].mirrors, vec!["registry.local:5000/release"]);
}

#[test]
fn override_trust_bundle_layered_after_mirror_ca() {
    let override_bundle =
        "-----BEGIN CERTIFICATE-----\noverride cert body\n-----END CERTIFICATE-----";
    let mut cluster = baremetal_cluster();
    cluster.install_config_overrides =
        serde_json::json!({ "additionalTrustBundle": override_bundle }).to_string();

    let data = builder(StubMirrorRegistries::configured())
        .get_install_config(&cluster, true, USER_CA)
        .unwrap();
    let result: InstallerConfig = serde_yaml::from_slice(&data).unwrap();
    assert_eq!(
        result.additional_trust_bundle.unwrap(),
        format!(" | \n{MIRROR_CA}\n{override_bundle}")
    );
}

#[test]
fn validate_patch_round_trip() {
    let cluster = baremetal_cluster();
    let b = builder(StubMirrorRegistries::unconfigured());

    b.validate_install_config_patch(
        &cluster,
        r#"{"apiVersion": "v3", "baseDomain": "example.com", "metadata": {"name": "things"}}"#,
    )
    .unwrap();

    assert!(b
        .validate_install_config_patch(&cluster, r#"{"apiVersion": 3}"#)
        .is_err());
    assert!(b
        .validate_install_config_patch(&cluster, r#"{"foo": "bar"}"#)
        .is_err());
}

#[test]
fn yaml_preserves_duplicate_network_entries() {
    let mut cluster = baremetal_cluster();
    cluster.cluster_networks = vec![
        ClusterNetwork {
            cidr: "1.3.0.0/16".to_string(),
            host_prefix: 24,
        },
        ClusterNetwork {
            cidr: "1.3.0.0/16".to_string(),
            host_prefix: 24,
        },
    ];
    cluster.service_networks = vec![
        ServiceNetwork {
            cidr: "1.2.5.0/24".to_string(),
        },
        ServiceNetwork {
            cidr: "1.4.0.0/16".to_string(),
        },
    ];
    cluster.machine_networks = vec![
        MachineNetwork {
            cidr: "1.2.3.0/24".to_string(),
        },
        MachineNetwork {
            cidr: "1.2.3.0/24".to_string(),
        },
    ];

    let result = render(&builder(StubMirrorRegistries::unconfigured()), &cluster);
    assert_eq!(result.networking.cluster_network.len(), 2);
    assert_eq!(result.networking.service_network.len(), 2);
    assert_eq!(result.networking.machine_network.unwrap().len(), 2);
}
