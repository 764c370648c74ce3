//! Boundary to the remote key-custody service.
//!
//! The private key never leaves the service, so every RSA operation is a
//! remote call on exactly one block. Implementations own transport, credentials
//! and any retry policy; the adapter only sequences calls.

use async_trait::async_trait;
use common::protocol::{KeyBundle, KeyOperationResult, KeyOperationsParameters};
use common::RemoteError;

use crate::key_ref::KeyReference;

/// Single-block operations offered by the custody service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteCipher: Send + Sync {
    /// Encrypt one block. `params.value` is the unpadded base64 plaintext;
    /// the result value is the base64 ciphertext of one RSA block.
    async fn encrypt_block(
        &self,
        key: &KeyReference,
        params: KeyOperationsParameters,
    ) -> Result<KeyOperationResult, RemoteError>;

    /// Decrypt one block. `params.value` is the base64 ciphertext of one RSA
    /// block; the result value is the unpadded base64 plaintext.
    async fn decrypt_block(
        &self,
        key: &KeyReference,
        params: KeyOperationsParameters,
    ) -> Result<KeyOperationResult, RemoteError>;

    /// Look up the public key and attributes of `key`.
    async fn key_metadata(&self, key: &KeyReference) -> Result<KeyBundle, RemoteError>;
}
