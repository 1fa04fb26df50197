//! Process-wide configuration, loaded lazily from the environment.
//!
//! The deployed verifier carries its configuration as a single
//! environment variable holding base64-encoded YAML. It is decoded at
//! most once per process; container reuse across invocations sees the
//! cached value. The one-time initialization is arbitrated by
//! [`std::sync::OnceLock`], so concurrent first accesses cannot race.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GuardError;
use crate::options::TrustMode;

/// Environment variable holding the base64-encoded YAML configuration.
pub const CONFIG_ENV: &str = "FUNCGUARD_CONFIG";

/// Operator-supplied configuration for the verifier function.
///
/// Immutable for the process lifetime once loaded. Absence of key
/// material under key-based trust is not validated here; it surfaces
/// at dispatch time through the verification engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Cloud access key. Empty when ambient credentials are in effect.
    #[serde(default)]
    pub access_key: String,
    /// Cloud secret key. Empty when ambient credentials are in effect.
    #[serde(default)]
    pub secret_key: String,
    /// Home region of the verifier deployment.
    pub region: String,
    /// Storage bucket holding signatures and verification artifacts.
    pub bucket: String,
    /// Public key reference for key-based trust. May be empty.
    #[serde(default)]
    pub public_key: String,
    /// Keyless trust mode flag.
    #[serde(default)]
    pub is_keyless: bool,
    /// Post-verification action selector (e.g. tag, quarantine).
    #[serde(default)]
    pub action: String,
    /// Notification topic for verification results.
    #[serde(default)]
    pub sns_topic_arn: String,
    /// Allow-list of function tag keys to scope verification.
    #[serde(default)]
    pub included_func_tag_keys: Vec<String>,
    /// Allow-list of regions to scope verification.
    #[serde(default)]
    pub included_func_regions: Vec<String>,
    /// Audit-trail name used during provisioning; not read at runtime.
    #[serde(default)]
    pub cloud_trail_name: String,
}

impl Configuration {
    /// Decode a configuration from a base64-encoded YAML blob.
    pub fn from_base64(blob: &str) -> Result<Self, GuardError> {
        let decoded = STANDARD
            .decode(blob.trim())
            .map_err(|e| GuardError::ConfigDecode {
                message: e.to_string(),
            })?;
        serde_yaml::from_slice(&decoded).map_err(|e| GuardError::ConfigSchema {
            message: e.to_string(),
        })
    }

    /// Encode this configuration as a base64 YAML blob suitable for
    /// the [`CONFIG_ENV`] environment variable.
    pub fn to_env_blob(&self) -> Result<String, GuardError> {
        let yaml = serde_yaml::to_string(self).map_err(|e| GuardError::ConfigSchema {
            message: e.to_string(),
        })?;
        Ok(STANDARD.encode(yaml.as_bytes()))
    }

    /// Trust mode derived from the keyless flag.
    #[must_use]
    pub fn trust_mode(&self) -> TrustMode {
        if self.is_keyless {
            TrustMode::Keyless
        } else {
            TrustMode::KeyBased
        }
    }
}

static CONFIG: OnceLock<Configuration> = OnceLock::new();

/// Lazily-populated, process-wide configuration store.
///
/// A process that never sees a qualifying event never loads
/// configuration at all.
pub struct ConfigStore;

impl ConfigStore {
    /// Get the process-wide configuration, loading it on first access.
    ///
    /// Reads [`CONFIG_ENV`] exactly once per process; later calls
    /// return the cached value without touching the environment.
    pub fn get() -> Result<&'static Configuration, GuardError> {
        if let Some(config) = CONFIG.get() {
            return Ok(config);
        }
        let blob = std::env::var(CONFIG_ENV).map_err(|_| GuardError::ConfigMissing {
            variable: CONFIG_ENV,
        })?;
        let loaded = Configuration::from_base64(&blob)?;
        debug!(
            region = %loaded.region,
            bucket = %loaded.bucket,
            keyless = loaded.is_keyless,
            "Configuration loaded"
        );
        // If another invocation won the race, its copy is kept and
        // ours is dropped; both decoded the same blob.
        Ok(CONFIG.get_or_init(|| loaded))
    }
}
