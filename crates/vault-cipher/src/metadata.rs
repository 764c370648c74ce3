//! Validated key metadata.
//!
//! The custody service returns a [`KeyBundle`] whose fields are all optional.
//! [`KeyMetadata`] is the required, fully-populated form the adapter checks
//! before it will address the key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::protocol::KeyBundle;

use crate::error::{ConfigError, KeyConstraint};
use crate::profile::SUPPORTED_KEY_SIZES;

/// Key type as reported by the custody service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyType {
    /// Software-protected RSA key.
    Rsa,
    /// Any other type (`RSA-HSM`, `EC`, `oct`, ...), kept verbatim.
    Other(String),
}

impl KeyType {
    fn from_kty(kty: &str) -> Self {
        match kty {
            "RSA" => KeyType::Rsa,
            other => KeyType::Other(other.to_owned()),
        }
    }
}

/// Key operation names checked during validation.
pub const OP_ENCRYPT: &str = "encrypt";
pub const OP_DECRYPT: &str = "decrypt";

/// Key metadata with every field the adapter relies on present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMetadata {
    pub key_type: KeyType,
    /// Modulus size in bits; zero for non-RSA keys.
    pub key_size_bits: usize,
    pub enabled: bool,
    pub permitted_operations: Vec<String>,
}

impl KeyMetadata {
    /// Check that the key can back a chunked cipher adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::KeyUnsuitable`] naming the first violated
    /// constraint, or [`ConfigError::UnsupportedKeySize`] for a modulus that
    /// is not 2048, 3072 or 4096 bits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unsuitable = |reason| Err(ConfigError::KeyUnsuitable { reason });

        if let KeyType::Other(kty) = &self.key_type {
            return unsuitable(KeyConstraint::NotRsa(kty.clone()));
        }
        if !self.enabled {
            return unsuitable(KeyConstraint::Disabled);
        }
        for op in [OP_ENCRYPT, OP_DECRYPT] {
            if !self.permits(op) {
                return unsuitable(KeyConstraint::MissingOperation(op));
            }
        }
        if !SUPPORTED_KEY_SIZES.contains(&self.key_size_bits) {
            return Err(ConfigError::UnsupportedKeySize {
                bits: self.key_size_bits,
            });
        }
        Ok(())
    }

    fn permits(&self, op: &str) -> bool {
        self.permitted_operations.iter().any(|o| o == op)
    }
}

impl TryFrom<KeyBundle> for KeyMetadata {
    type Error = ConfigError;

    fn try_from(bundle: KeyBundle) -> Result<Self, Self::Error> {
        let missing = |field: &str| ConfigError::MalformedMetadata(format!("missing {field}"));

        let key = bundle.key.ok_or_else(|| missing("key"))?;
        let enabled = bundle
            .attributes
            .and_then(|a| a.enabled)
            .ok_or_else(|| missing("attributes.enabled"))?;
        let kty = key.kty.ok_or_else(|| missing("key.kty"))?;
        let permitted_operations = key.key_ops.ok_or_else(|| missing("key.key_ops"))?;

        let key_type = KeyType::from_kty(&kty);
        let key_size_bits = match key_type {
            KeyType::Rsa => {
                let n = key.n.ok_or_else(|| missing("key.n"))?;
                modulus_bits(&n)?
            }
            KeyType::Other(_) => 0,
        };

        Ok(Self {
            key_type,
            key_size_bits,
            enabled,
            permitted_operations,
        })
    }
}

/// Size in bits of a base64url-encoded big-endian RSA modulus, rounded to whole bytes.
fn modulus_bits(n: &str) -> Result<usize, ConfigError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(n.trim_end_matches('='))
        .map_err(|e| ConfigError::MalformedMetadata(format!("key.n is not base64url: {e}")))?;
    let significant = bytes.iter().skip_while(|b| **b == 0).count();
    Ok(significant * 8)
}
