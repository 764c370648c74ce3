//! Wire types and collaborator errors shared across `vault-cipher` crates.

pub mod error;
pub mod protocol;

pub use error::RemoteError;
pub use protocol::EncryptionAlgorithm;
