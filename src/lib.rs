#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Install configuration builder.
//!
//! Derives a complete, platform-specific installer configuration document
//! from the cluster/host domain model, then layers a user-supplied JSON
//! override patch on top while preserving the computed fields the user did
//! not touch. The transformation is pure and synchronous; mirror-registry
//! state and platform handlers are injected at construction.

pub mod builder;
pub mod cluster;
pub mod config;
pub mod error;
pub mod mirror;
pub mod network;
pub mod provider;

// Re-export the types most callers need.
pub use builder::InstallConfigBuilder;
pub use cluster::{ClusterSpec, HostSpec};
pub use config::InstallerConfig;
pub use error::{ConfigError, Result};
pub use mirror::{FileMirrorRegistries, MirrorRegistriesConfig, RegistryMirrorPair};
pub use provider::{Provider, ProviderRegistry};
