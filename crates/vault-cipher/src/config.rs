//! Configuration loading and validation for the cipher adapter.
//!
//! Values are read from environment variables prefixed `VAULT_CIPHER_`, e.g.
//! `VAULT_CIPHER_KEY_IDENTIFIER`. Loading fails with a message naming the
//! variable if a required one is missing or any value is invalid.

use anyhow::{Context, Result};
use common::EncryptionAlgorithm;
use serde::Deserialize;

use crate::key_ref::KeyReference;
use crate::telemetry::LogFormat;

/// Prefix of every environment variable read by [`AdapterConfig::from_env`].
pub const ENV_PREFIX: &str = "VAULT_CIPHER";

/// Validated adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Key identifier, `https://<vault>.<domain>/keys/<name>[/<version>]`.
    pub key_identifier: String,

    /// Padding scheme used for every block.
    pub algorithm: EncryptionAlgorithm,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

/// Configuration as read from the environment, before validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    key_identifier: String,

    #[serde(default = "default_algorithm")]
    algorithm: String,

    #[serde(default = "default_log_level")]
    log_level: String,

    #[serde(default = "default_log_format")]
    log_format: String,
}

fn default_algorithm() -> String {
    EncryptionAlgorithm::default().as_str().into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "json".into()
}

impl AdapterConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let raw: RawConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        raw.validate()
    }
}

impl RawConfig {
    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(self) -> Result<AdapterConfig> {
        if self.key_identifier.trim().is_empty() {
            anyhow::bail!("{ENV_PREFIX}_KEY_IDENTIFIER is required and must not be empty");
        }
        KeyReference::parse(&self.key_identifier)
            .with_context(|| format!("{ENV_PREFIX}_KEY_IDENTIFIER is invalid"))?;
        let algorithm = self
            .algorithm
            .parse::<EncryptionAlgorithm>()
            .with_context(|| format!("{ENV_PREFIX}_ALGORITHM is invalid"))?;
        if self.log_level.trim().is_empty() {
            anyhow::bail!("{ENV_PREFIX}_LOG_LEVEL must not be empty");
        }
        let log_format = self
            .log_format
            .parse::<LogFormat>()
            .with_context(|| format!("{ENV_PREFIX}_LOG_FORMAT is invalid"))?;

        Ok(AdapterConfig {
            key_identifier: self.key_identifier,
            algorithm,
            log_level: self.log_level,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ID: &str = "https://kv1.vault.example.net/keys/myKey/abc123";

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (format!("{ENV_PREFIX}_{k}"), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn valid() -> RawConfig {
        RawConfig {
            key_identifier: KEY_ID.into(),
            algorithm: default_algorithm(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        let cfg = AdapterConfig::load(env(&[("KEY_IDENTIFIER", KEY_ID)])).unwrap();
        assert_eq!(cfg.key_identifier, KEY_ID);
        assert_eq!(cfg.algorithm, EncryptionAlgorithm::Rsa15);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = AdapterConfig::load(env(&[
            ("KEY_IDENTIFIER", KEY_ID),
            ("ALGORITHM", "RSA-OAEP-256"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "text"),
        ]))
        .unwrap();
        assert_eq!(cfg.algorithm, EncryptionAlgorithm::RsaOaep256);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_identifier_is_rejected() {
        let err = AdapterConfig::load(env(&[("ALGORITHM", "RSA1_5")])).unwrap_err();
        assert!(format!("{err:#}").contains("VAULT_CIPHER_KEY_IDENTIFIER"));
    }

    #[test]
    fn unknown_algorithm_names_the_variable() {
        let err = AdapterConfig::load(env(&[
            ("KEY_IDENTIFIER", KEY_ID),
            ("ALGORITHM", "RSA-PSS"),
        ]))
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("VAULT_CIPHER_ALGORITHM"), "{msg}");
        assert!(msg.contains("RSA-PSS"), "{msg}");
    }

    #[test]
    fn unknown_log_format_names_the_variable() {
        let err = AdapterConfig::load(env(&[
            ("KEY_IDENTIFIER", KEY_ID),
            ("LOG_FORMAT", "yaml"),
        ]))
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("VAULT_CIPHER_LOG_FORMAT"), "{msg}");
        assert!(msg.contains("yaml"), "{msg}");
    }

    #[test]
    fn validate_rejects_empty_identifier() {
        let raw = RawConfig {
            key_identifier: "  ".into(),
            ..valid()
        };
        let err = raw.validate().unwrap_err();
        assert!(format!("{err:#}").contains("KEY_IDENTIFIER"));
    }

    #[test]
    fn validate_rejects_malformed_identifier() {
        let raw = RawConfig {
            key_identifier: "https://kv1.vault.example.net/secrets/myKey".into(),
            ..valid()
        };
        let err = raw.validate().unwrap_err();
        assert!(format!("{err:#}").contains("KEY_IDENTIFIER"));
    }

    #[test]
    fn validate_rejects_empty_log_level() {
        let raw = RawConfig {
            log_level: String::new(),
            ..valid()
        };
        let err = raw.validate().unwrap_err();
        assert!(format!("{err:#}").contains("VAULT_CIPHER_LOG_LEVEL"));
    }

    #[test]
    fn validate_accepts_valid_config() {
        let cfg = valid().validate().unwrap();
        assert_eq!(cfg.algorithm, EncryptionAlgorithm::Rsa15);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }
}
