//! Configuration types for envelope decoding and normalization.
//!
//! [`IngestConfig`] is cheap to clone and deserializes from any serde format,
//! so the server can embed it in its own configuration file.
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default();
//! config.validate().expect("default config is valid");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration for the ingest stage.
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "strip_control_chars": true,
///   "max_decoded_bytes": 1048576
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Version of the configuration layout.
    ///
    /// Default: `1`
    pub version: u32,

    /// Whether to strip control characters from the Kubernetes metadata
    /// strings (`cluster`, `namespace`, `pod`, `container`).
    ///
    /// The log text itself is never altered; only the short identifiers that
    /// end up as structured log fields are cleaned.
    ///
    /// Default: `true`
    pub strip_control_chars: bool,

    /// Maximum size in bytes of a decoded bus payload.
    ///
    /// Checked after base64 decoding and before UTF-8/JSON parsing. `None`
    /// disables the check; the HTTP body limit still applies.
    ///
    /// Default: `None`
    pub max_decoded_bytes: Option<usize>,
}

/// Errors produced by [`IngestConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unsupported ingest config version {0}; expected 1")]
    UnsupportedVersion(u32),

    #[error("max_decoded_bytes must be greater than zero")]
    ZeroDecodedLimit,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            version: 1,
            strip_control_chars: true,
            max_decoded_bytes: None,
        }
    }
}

impl IngestConfig {
    /// Validates the configuration.
    ///
    /// Call this at startup so a bad limit fails fast instead of rejecting
    /// every bus message at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.max_decoded_bytes == Some(0) {
            return Err(ConfigError::ZeroDecodedLimit);
        }
        Ok(())
    }
}
