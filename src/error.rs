use thiserror::Error;

/// Errors raised while assembling or patching an install configuration.
///
/// Every variant is terminal for the invocation that produced it; nothing in
/// this crate retries. Callers decide whether a failure is worth retrying.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The override patch is not parseable JSON.
    #[error("install config overrides are not valid JSON: {reason}")]
    InvalidOverrides { reason: String },

    /// The override patch references unknown fields or carries wrong value
    /// types for known fields.
    #[error("install config overrides rejected: {reason}")]
    Schema { reason: String },

    /// A host inventory payload could not be parsed.
    #[error("host inventory is malformed: {reason}")]
    InvalidInventory { reason: String },

    /// A network address from the domain model is not a valid CIDR.
    #[error("invalid CIDR '{cidr}': {reason}")]
    InvalidCidr { cidr: String, reason: String },

    /// No handler is registered for the cluster's platform type.
    #[error("no provider registered for platform '{platform}'")]
    UnsupportedPlatform { platform: String },

    /// The mirror-registry collaborator failed.
    #[error("mirror registries: {reason}")]
    MirrorRegistries { reason: String },

    /// The finished document could not be serialized.
    #[error("failed to serialize install config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        ConfigError::Schema {
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the override patch rather than the
    /// cluster model or a collaborator. Useful for surfacing 4xx vs 5xx.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidOverrides { .. } | ConfigError::Schema { .. }
        )
    }
}
