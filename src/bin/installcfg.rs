//! Diagnostic CLI for the install config builder.
//!
//! Renders, pre-flights and inspects install configurations from a cluster
//! spec file without going through the hosting service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use installcfg::{ClusterSpec, FileMirrorRegistries, InstallConfigBuilder, ProviderRegistry};

#[derive(Parser)]
#[command(name = "installcfg", version, about = "Install config builder diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the install config document for a cluster spec
    Build {
        /// Path to the cluster spec (JSON)
        cluster: PathBuf,
        /// CA certificate file to include in additionalTrustBundle
        #[arg(long)]
        trust_bundle: Option<PathBuf>,
        /// Mirror registry CA file; providing one marks mirror registries
        /// as configured
        #[arg(long)]
        mirror_ca: Option<PathBuf>,
    },
    /// Pre-flight check of an install config override patch
    Validate {
        /// Path to the cluster spec (JSON)
        cluster: PathBuf,
        /// Path to the override patch (JSON)
        patch: PathBuf,
    },
    /// Print the computed proxy-exclusion list
    NoProxy {
        /// Path to the cluster spec (JSON)
        cluster: PathBuf,
    },
}

fn load_cluster(path: &PathBuf) -> Result<ClusterSpec> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading cluster spec {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing cluster spec {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            cluster,
            trust_bundle,
            mirror_ca,
        } => {
            let cluster = load_cluster(&cluster)?;
            let ca = match &trust_bundle {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("reading CA file {}", path.display()))?,
                None => String::new(),
            };
            let mirrors = FileMirrorRegistries::new(mirror_ca, Vec::new());
            let builder = InstallConfigBuilder::new(Arc::new(mirrors), ProviderRegistry::default());
            let data = builder.get_install_config(&cluster, trust_bundle.is_some(), &ca)?;
            print!("{}", String::from_utf8_lossy(&data));
        }
        Commands::Validate { cluster, patch } => {
            let cluster = load_cluster(&cluster)?;
            let patch = std::fs::read_to_string(&patch)
                .with_context(|| format!("reading patch {}", patch.display()))?;
            let builder = InstallConfigBuilder::new(
                Arc::new(FileMirrorRegistries::unconfigured()),
                ProviderRegistry::default(),
            );
            builder.validate_install_config_patch(&cluster, &patch)?;
            println!("patch OK");
        }
        Commands::NoProxy { cluster } => {
            let cluster = load_cluster(&cluster)?;
            let builder = InstallConfigBuilder::new(
                Arc::new(FileMirrorRegistries::unconfigured()),
                ProviderRegistry::default(),
            );
            println!("{}", builder.generate_no_proxy(&cluster));
        }
    }
    Ok(())
}
