//! Chunked RSA encryption through a remote key-custody service.
//!
//! The custody service performs RSA operations on one block per call and the
//! private key never leaves it. [`CipherAdapter`] splits arbitrary payloads
//! into blocks sized for the key and padding scheme, sends them in order, and
//! reassembles the results.
//!
//! ```text
//! identifier   ──► KeyReference     ─┐
//! key metadata ──► KeyMetadata      ─┼──► CipherAdapter ──► RemoteCipher
//! algorithm    ──► AlgorithmProfile ─┘    (one remote call per block)
//! ```

pub mod adapter;
pub mod blocks;
pub mod config;
pub mod error;
pub mod key_ref;
pub mod metadata;
pub mod profile;
pub mod remote;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use adapter::CipherAdapter;
pub use common::{EncryptionAlgorithm, RemoteError};
pub use config::AdapterConfig;
pub use error::{CipherError, ConfigError, KeyConstraint, ParseError};
pub use key_ref::KeyReference;
pub use metadata::KeyMetadata;
pub use profile::AlgorithmProfile;
pub use remote::RemoteCipher;
pub use telemetry::{init_tracing, LogFormat};
