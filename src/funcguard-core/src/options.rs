//! Verification options and their builder.
//!
//! [`build_verify_options`] is deterministic and referentially
//! transparent: the experimental keyless-trust signal is an explicit
//! field on the produced options, and the caller applies it to
//! process-wide state via [`apply_experimental_toggle`].

use serde::{Deserialize, Serialize};

/// Conventional public-key filename used when key-based trust
/// supplies no explicit material.
pub const DEFAULT_KEY_REFERENCE: &str = "cosign.pub";

/// Well-known public transparency-log endpoint.
pub const TRANSPARENCY_LOG_URL: &str = "https://rekor.sigstore.dev";

/// Environment toggle telling the downstream engine to operate in its
/// experimental keyless-trust mode.
pub const EXPERIMENTAL_ENV: &str = "FUNCGUARD_EXPERIMENTAL";

/// Whether verification relies on an ambient trust root or an
/// operator-supplied public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustMode {
    /// Embedded/ambient trust root; no operator key required.
    Keyless,
    /// Explicit operator-supplied public key.
    KeyBased,
}

/// Output format requested from the verification engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON output.
    Json,
    /// Human-readable text output.
    Text,
}

/// Scoped options handed to the external verification engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Public key reference. Empty in experimental keyless mode.
    pub key: String,
    /// Whether the engine checks signed claims.
    pub check_claims: bool,
    /// Output format.
    pub output: OutputFormat,
    /// Whether a local-image shortcut is permitted.
    pub local_image: bool,
    /// Whether insecure registry access is permitted.
    pub allow_insecure_registry: bool,
    /// Transparency-log endpoint recording verification events.
    pub transparency_log_url: String,
    /// Signal that the engine should run in experimental keyless
    /// mode. Applied to process state by the caller, never here.
    pub experimental_keyless: bool,
}

/// Build verification options from the trust mode and key material.
///
/// Keyless with no explicit material yields an empty key reference
/// and raises the experimental flag; otherwise the key reference
/// defaults to [`DEFAULT_KEY_REFERENCE`] unless overridden.
#[must_use]
pub fn build_verify_options(mode: TrustMode, key_material: &str) -> VerifyOptions {
    let (key, experimental_keyless) = if key_material.is_empty() {
        match mode {
            TrustMode::Keyless => (String::new(), true),
            TrustMode::KeyBased => (DEFAULT_KEY_REFERENCE.to_string(), false),
        }
    } else {
        (key_material.to_string(), false)
    };

    VerifyOptions {
        key,
        check_claims: true,
        output: OutputFormat::Json,
        local_image: false,
        allow_insecure_registry: false,
        transparency_log_url: TRANSPARENCY_LOG_URL.to_string(),
        experimental_keyless,
    }
}

/// Apply the experimental keyless signal to process-wide state.
///
/// Safe to call once per dispatch: trust mode is constant for a
/// configuration's lifetime, so the toggle never needs resetting
/// within one process.
pub fn apply_experimental_toggle(options: &VerifyOptions) {
    if options.experimental_keyless {
        std::env::set_var(EXPERIMENTAL_ENV, "1");
    }
}
