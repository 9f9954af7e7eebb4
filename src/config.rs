//! Tool configuration.
//!
//! Loaded once per invocation from `ogstamp.toml`, validated up front, and
//! never mutated during a run. Config files are sparse — every field has a
//! default, and unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # Which sub-generators to process. Omit to process every recognized one.
//! enabled_plugins = [
//!     "docusaurus-plugin-content-docs",
//!     "docusaurus-plugin-content-blog",
//! ]
//!
//! # Verbose diagnostics (resolved config, computed image URLs)
//! debug = false
//!
//! [provider]
//! publishable_key = "pk_live_..."
//! signature_secret = "ss_..."
//! endpoint = "https://og.ohimg.dev/og"   # default
//!
//! # Forwarded verbatim to the image provider. Scalar values only.
//! [image_options]
//! theme = "dark"
//! width = 1200
//!
//! [processing]
//! max_processes = 4    # omit for sequential processing (the default)
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default image-service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://og.ohimg.dev/og";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `ogstamp.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampConfig {
    /// Sub-generators to process. `None` means all recognized plugins.
    pub enabled_plugins: Option<Vec<String>>,
    /// Verbose diagnostics.
    pub debug: bool,
    /// Image-service credentials and endpoint.
    pub provider: ProviderConfig,
    /// Opaque options forwarded to the image provider.
    pub image_options: toml::Table,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

/// Image-service credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub publishable_key: String,
    pub signature_secret: String,
    pub endpoint: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            publishable_key: String::new(),
            signature_secret: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of routes processed in parallel. Absent means
    /// sequential — one route fully completes before the next begins.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

impl StampConfig {
    /// Load and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate config values. Credentials are checked here, once at
    /// startup — per-route processing assumes a well-formed config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.publishable_key.is_empty() {
            return Err(ConfigError::Validation(
                "provider.publishable_key must be set".into(),
            ));
        }
        if self.provider.signature_secret.is_empty() {
            return Err(ConfigError::Validation(
                "provider.signature_secret must be set".into(),
            ));
        }
        if self.provider.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "provider.endpoint must not be empty".into(),
            ));
        }
        if let Some(list) = &self.enabled_plugins {
            if list.iter().any(|name| name.is_empty()) {
                return Err(ConfigError::Validation(
                    "enabled_plugins entries must not be empty".into(),
                ));
            }
        }
        for (key, value) in &self.image_options {
            if matches!(value, toml::Value::Array(_) | toml::Value::Table(_)) {
                return Err(ConfigError::Validation(format!(
                    "image_options.{key} must be a scalar value"
                )));
            }
        }
        Ok(())
    }

    /// Image options as the JSON map the provider interface expects.
    pub fn image_options_json(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(&self.image_options) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// Resolve the effective parallelism from config.
///
/// - `None` → 1 (sequential, the reference behavior)
/// - `Some(n)` → clamped to `1..=cores` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.clamp(1, cores)).unwrap_or(1)
}

/// A stock config file with all options documented.
pub fn stock_config_toml() -> String {
    format!(
        r#"# ogstamp configuration
# All options except the provider credentials are optional — defaults shown.

# Which sub-generators to process. Omit to process every recognized plugin:
#   docusaurus-plugin-content-docs
#   docusaurus-plugin-content-pages
#   docusaurus-plugin-content-blog
# enabled_plugins = ["docusaurus-plugin-content-blog"]

# Verbose diagnostics: resolved configuration, computed image URLs.
debug = false

[provider]
# Credentials for the image service. Both are required for stamping.
publishable_key = ""
signature_secret = ""
# Image-service endpoint.
endpoint = "{DEFAULT_ENDPOINT}"

# Options forwarded verbatim to the image provider as query parameters.
# Scalar values only (strings, numbers, booleans).
[image_options]
# theme = "dark"
# width = 1200

[processing]
# Maximum number of routes processed in parallel. Omit for sequential
# processing (one route at a time). Clamped to the number of CPU cores.
# max_processes = 4
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> StampConfig {
        StampConfig {
            provider: ProviderConfig {
                publishable_key: "pk".into(),
                signature_secret: "ss".into(),
                endpoint: DEFAULT_ENDPOINT.into(),
            },
            ..StampConfig::default()
        }
    }

    #[test]
    fn default_config_has_expected_shape() {
        let config = StampConfig::default();
        assert!(config.enabled_plugins.is_none());
        assert!(!config.debug);
        assert_eq!(config.provider.endpoint, DEFAULT_ENDPOINT);
        assert!(config.image_options.is_empty());
        assert!(config.processing.max_processes.is_none());
    }

    #[test]
    fn sparse_file_overrides_only_named_values() {
        let config: StampConfig = toml::from_str(
            r#"
            debug = true
            [provider]
            publishable_key = "pk"
            signature_secret = "ss"
            "#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.provider.publishable_key, "pk");
        assert_eq!(config.provider.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<StampConfig, _> = toml::from_str("enabled_plugin = []");
        assert!(result.is_err());
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let config = StampConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("publishable_key")
        ));
    }

    #[test]
    fn non_scalar_image_option_fails_validation() {
        let mut config = valid();
        config
            .image_options
            .insert("nested".into(), toml::Value::Array(vec![]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("image_options.nested")
        ));
    }

    #[test]
    fn image_options_convert_to_json_map() {
        let mut config = valid();
        config
            .image_options
            .insert("theme".into(), toml::Value::String("dark".into()));
        config
            .image_options
            .insert("width".into(), toml::Value::Integer(1200));
        let map = config.image_options_json();
        assert_eq!(map.get("theme").unwrap(), "dark");
        assert_eq!(map.get("width").unwrap(), 1200);
    }

    #[test]
    fn effective_threads_defaults_to_sequential() {
        assert_eq!(effective_threads(&ProcessingConfig::default()), 1);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism().unwrap().get();
        let config = ProcessingConfig {
            max_processes: Some(10_000),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn stock_config_parses_and_validates_shape() {
        let config: StampConfig = toml::from_str(&stock_config_toml()).unwrap();
        // credentials are intentionally blank in the stock file
        assert!(config.validate().is_err());
        assert_eq!(config.provider.endpoint, DEFAULT_ENDPOINT);
    }
}
