//! Error taxonomy of the cipher adapter.
//!
//! Construction-time failures ([`ParseError`], [`ConfigError`]) are fatal to
//! adapter setup. Per-call failures ([`CipherError`]) abort a single
//! `encrypt`/`decrypt` call and never carry partial output.

use std::fmt;

use common::RemoteError;
use thiserror::Error;

use crate::key_ref::ACCEPTED_SHAPE;

/// The key identifier string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The identifier does not match the accepted key identifier shape.
    #[error("malformed key identifier {identifier:?}; expected a key identifier such as {ACCEPTED_SHAPE}")]
    MalformedIdentifier {
        /// The rejected input.
        identifier: String,
    },
}

/// Constraint a key failed to satisfy during adapter construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyConstraint {
    /// The key type is not RSA.
    NotRsa(String),
    /// The key is disabled.
    Disabled,
    /// The key's permitted operations lack the named operation.
    MissingOperation(&'static str),
}

impl fmt::Display for KeyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyConstraint::NotRsa(kty) => {
                write!(f, "key type is {kty:?}, not RSA; use an RSA key")
            }
            KeyConstraint::Disabled => f.write_str("key is not enabled; enable it to continue"),
            KeyConstraint::MissingOperation(op) => {
                write!(f, "key needs the '{op}' permission; grant it to continue")
            }
        }
    }
}

/// The adapter could not be constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No remote collaborator was supplied.
    #[error("remote key service client is required")]
    MissingClient,

    /// The key identifier did not parse.
    #[error(transparent)]
    Identifier(#[from] ParseError),

    /// The key exists but cannot be used for chunked encryption.
    #[error("key unsuitable: {reason}")]
    KeyUnsuitable {
        /// The violated constraint.
        reason: KeyConstraint,
    },

    /// The key size is not 2048, 3072 or 4096 bits.
    #[error("unsupported key size {bits} bits; the key must be 2048, 3072 or 4096 bits")]
    UnsupportedKeySize {
        /// Observed modulus size.
        bits: usize,
    },

    /// Fetching key metadata from the collaborator failed.
    #[error("failed to fetch key metadata: {0}")]
    Metadata(#[source] RemoteError),

    /// The key metadata returned by the collaborator is incomplete or undecodable.
    #[error("malformed key metadata: {0}")]
    MalformedMetadata(String),
}

/// A single `encrypt` or `decrypt` call failed.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The remote primitive failed on the given block.
    #[error("remote operation failed on block {block_index}: {cause}")]
    RemoteFailure {
        /// Zero-based index of the failing block.
        block_index: usize,
        /// Collaborator error.
        #[source]
        cause: RemoteError,
    },

    /// The remote primitive answered with text that cannot be used for the given block.
    #[error("malformed remote response for block {block_index}")]
    MalformedResponse {
        /// Zero-based index of the offending block.
        block_index: usize,
    },

    /// A ciphertext block handed to `decrypt` is not base64 text.
    #[error("malformed ciphertext in block {block_index}")]
    MalformedCiphertext {
        /// Zero-based index of the offending block.
        block_index: usize,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}
