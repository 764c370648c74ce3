//! Request and response types exchanged with the remote key-custody service.
//!
//! These mirror the JSON bodies of the service's key-operation and key-lookup
//! endpoints. Fields the service treats as optional are `Option` here; the
//! cipher crate validates them into required types before use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Algorithms
// ---------------------------------------------------------------------------

/// Asymmetric padding scheme applied by the custody service on each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EncryptionAlgorithm {
    /// RSAES-PKCS1-v1_5.
    #[default]
    #[serde(rename = "RSA1_5")]
    Rsa15,
    /// RSAES-OAEP with SHA-1 and MGF1-SHA-1.
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,
    /// RSAES-OAEP with SHA-256 and MGF1-SHA-256.
    #[serde(rename = "RSA-OAEP-256")]
    RsaOaep256,
}

impl EncryptionAlgorithm {
    /// Name the custody service uses for this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionAlgorithm::Rsa15 => "RSA1_5",
            EncryptionAlgorithm::RsaOaep => "RSA-OAEP",
            EncryptionAlgorithm::RsaOaep256 => "RSA-OAEP-256",
        }
    }
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The algorithm name is not one the custody service supports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown encryption algorithm {0:?}; expected one of RSA1_5, RSA-OAEP, RSA-OAEP-256")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for EncryptionAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RSA1_5" => Ok(EncryptionAlgorithm::Rsa15),
            "RSA-OAEP" => Ok(EncryptionAlgorithm::RsaOaep),
            "RSA-OAEP-256" => Ok(EncryptionAlgorithm::RsaOaep256),
            other => Err(UnknownAlgorithm(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Key operations (encrypt / decrypt)
// ---------------------------------------------------------------------------

/// Request body for a single-block `encrypt` or `decrypt` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOperationsParameters {
    /// Padding scheme to apply.
    pub alg: EncryptionAlgorithm,
    /// Base64 text of exactly one block.
    pub value: String,
}

impl KeyOperationsParameters {
    /// Construct parameters for one block.
    pub fn new(alg: EncryptionAlgorithm, value: impl Into<String>) -> Self {
        Self {
            alg,
            value: value.into(),
        }
    }
}

/// Response body of a single-block `encrypt` or `decrypt` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOperationResult {
    /// Full identifier of the key version that performed the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Base64 text of the resulting block.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Key lookup
// ---------------------------------------------------------------------------

/// Response body of a key lookup, as returned by the custody service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyBundle {
    /// Public part of the key.
    #[serde(default)]
    pub key: Option<JsonWebKey>,
    /// Management attributes.
    #[serde(default)]
    pub attributes: Option<KeyAttributes>,
}

/// JSON Web Key as exposed by the custody service (public members only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key identifier URL.
    #[serde(default)]
    pub kid: Option<String>,
    /// Key type, e.g. `"RSA"`, `"RSA-HSM"`, `"EC"`.
    #[serde(default)]
    pub kty: Option<String>,
    /// Operations the key is permitted to perform.
    #[serde(default)]
    pub key_ops: Option<Vec<String>>,
    /// RSA modulus, base64url without padding.
    #[serde(default)]
    pub n: Option<String>,
    /// RSA public exponent, base64url without padding.
    #[serde(default)]
    pub e: Option<String>,
}

/// Management attributes of a key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyAttributes {
    /// Whether the key may currently be used.
    #[serde(default)]
    pub enabled: Option<bool>,
}
