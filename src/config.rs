//! The install config document handed to the downstream installer.
//!
//! Key names and nesting must match the installer's schema bit-exactly, hence
//! the explicit renames. Every struct rejects unknown fields so the override
//! validator and the builder share a single allow-list of recognized keys.

use serde::{Deserialize, Serialize};

/// API version the installer expects at the document root.
pub const INSTALL_CONFIG_API_VERSION: &str = "v1";

/// Network plugin used when the cluster does not configure one.
pub const DEFAULT_NETWORK_TYPE: &str = "OVNKubernetes";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerConfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(rename = "baseDomain")]
    pub base_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Proxy>,
    pub networking: Networking,
    pub metadata: Metadata,
    #[serde(rename = "controlPlane")]
    pub control_plane: MachinePool,
    pub compute: Vec<MachinePool>,
    pub platform: Platform,
    #[serde(
        rename = "bootstrapInPlace",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bootstrap_in_place: Option<BootstrapInPlace>,
    #[serde(default)]
    pub fips: bool,
    #[serde(
        rename = "additionalTrustBundle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_trust_bundle: Option<String>,
    #[serde(
        rename = "imageContentSources",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_content_sources: Option<Vec<ImageContentSource>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Proxy {
    #[serde(rename = "httpProxy", default, skip_serializing_if = "String::is_empty")]
    pub http_proxy: String,
    #[serde(
        rename = "httpsProxy",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub https_proxy: String,
    #[serde(rename = "noProxy", default, skip_serializing_if = "String::is_empty")]
    pub no_proxy: String,
}

/// Networking block. The three lists preserve the cluster's input order and
/// cardinality exactly; `machineNetwork` is omitted when nothing was
/// configured or derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Networking {
    #[serde(rename = "networkType")]
    pub network_type: String,
    #[serde(rename = "clusterNetwork")]
    pub cluster_network: Vec<ClusterNetworkEntry>,
    #[serde(
        rename = "machineNetwork",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub machine_network: Option<Vec<MachineNetworkEntry>>,
    #[serde(rename = "serviceNetwork")]
    pub service_network: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterNetworkEntry {
    pub cidr: String,
    #[serde(rename = "hostPrefix", default)]
    pub host_prefix: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineNetworkEntry {
    pub cidr: String,
}

/// Per-role hyperthreading setting in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HyperthreadingSetting {
    Enabled,
    Disabled,
}

impl Default for HyperthreadingSetting {
    fn default() -> Self {
        HyperthreadingSetting::Enabled
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachinePool {
    pub hyperthreading: HyperthreadingSetting,
    pub name: String,
    pub replicas: usize,
}

/// Platform block: exactly one member is populated, selected by the
/// cluster's platform type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Platform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baremetal: Option<BaremetalPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub none: Option<PlatformNone>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaremetalPlatform {
    #[serde(rename = "apiVip", default, skip_serializing_if = "String::is_empty")]
    pub api_vip: String,
    #[serde(
        rename = "ingressVip",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub ingress_vip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformNone {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapInPlace {
    #[serde(rename = "installationDisk")]
    pub installation_disk: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageContentSource {
    pub source: String,
    pub mirrors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_installer_key_names() {
        let cfg = InstallerConfig {
            api_version: INSTALL_CONFIG_API_VERSION.to_string(),
            base_domain: "example.com".to_string(),
            networking: Networking {
                network_type: DEFAULT_NETWORK_TYPE.to_string(),
                cluster_network: vec![ClusterNetworkEntry {
                    cidr: "10.128.0.0/14".to_string(),
                    host_prefix: 23,
                }],
                machine_network: None,
                service_network: vec!["172.30.0.0/16".to_string()],
            },
            metadata: Metadata {
                name: "test".to_string(),
            },
            ..InstallerConfig::default()
        };

        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(yaml.contains("apiVersion: v1"));
        assert!(yaml.contains("baseDomain: example.com"));
        assert!(yaml.contains("networkType: OVNKubernetes"));
        assert!(yaml.contains("hostPrefix: 23"));
        assert!(yaml.contains("serviceNetwork:"));
        // Unset optional blocks never appear in the output.
        assert!(!yaml.contains("proxy:"));
        assert!(!yaml.contains("machineNetwork:"));
        assert!(!yaml.contains("additionalTrustBundle:"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<InstallerConfig>(r#"{"apiVersion": "v1", "foo": 1}"#)
            .unwrap_err();
        assert!(err.to_string().contains("foo"));
    }
}
