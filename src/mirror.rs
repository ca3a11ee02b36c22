//! Mirror-registry collaborator contract.
//!
//! The real implementation lives in the service that embeds this crate; the
//! builder only asks whether mirrors are configured and for their CA / the
//! location-mirror mapping. Injected at construction for test isolation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// One location -> mirror mapping from the registries configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMirrorPair {
    pub location: String,
    pub mirror: String,
}

/// Mirror-registry state consumed by the install config builder.
///
/// Implementations must be safe for concurrent read access; the builder only
/// ever queries, never mutates.
#[cfg_attr(test, mockall::automock)]
pub trait MirrorRegistriesConfig: Send + Sync {
    fn is_mirror_registries_configured(&self) -> bool;

    /// Location/mirror pairs for the document's image content sources.
    fn extract_location_mirror_pairs(&self) -> Result<Vec<RegistryMirrorPair>>;

    /// PEM bytes of the mirror registry CA.
    fn mirror_ca(&self) -> Result<Vec<u8>>;
}

/// File-backed mirror registry source used by the diagnostic CLI. Reports
/// "configured" only when a CA file path was supplied.
#[derive(Debug, Default)]
pub struct FileMirrorRegistries {
    ca_path: Option<PathBuf>,
    pairs: Vec<RegistryMirrorPair>,
}

impl FileMirrorRegistries {
    #[must_use]
    pub fn new(ca_path: Option<PathBuf>, pairs: Vec<RegistryMirrorPair>) -> Self {
        Self { ca_path, pairs }
    }

    #[must_use]
    pub fn unconfigured() -> Self {
        Self::default()
    }
}

impl MirrorRegistriesConfig for FileMirrorRegistries {
    fn is_mirror_registries_configured(&self) -> bool {
        self.ca_path.is_some()
    }

    fn extract_location_mirror_pairs(&self) -> Result<Vec<RegistryMirrorPair>> {
        Ok(self.pairs.clone())
    }

    fn mirror_ca(&self) -> Result<Vec<u8>> {
        let path = self
            .ca_path
            .as_ref()
            .ok_or_else(|| ConfigError::MirrorRegistries {
                reason: "no mirror CA file configured".to_string(),
            })?;
        std::fs::read(path).map_err(|err| ConfigError::MirrorRegistries {
            reason: format!("reading {}: {err}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn unconfigured_source_reports_nothing() {
        let source = FileMirrorRegistries::unconfigured();
        assert!(!source.is_mirror_registries_configured());
        assert!(source.extract_location_mirror_pairs().unwrap().is_empty());
        assert!(matches!(
            source.mirror_ca(),
            Err(ConfigError::MirrorRegistries { .. })
        ));
    }

    #[test]
    fn reads_ca_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"mirror ca data").unwrap();

        let source = FileMirrorRegistries::new(Some(file.path().to_path_buf()), Vec::new());
        assert!(source.is_mirror_registries_configured());
        assert_eq!(source.mirror_ca().unwrap(), b"mirror ca data");
    }

    #[test]
    fn missing_ca_file_is_a_collaborator_error() {
        let source =
            FileMirrorRegistries::new(Some(PathBuf::from("/nonexistent/ca.pem")), Vec::new());
        assert!(matches!(
            source.mirror_ca(),
            Err(ConfigError::MirrorRegistries { .. })
        ));
    }
}
