//! [`CipherAdapter`]: chunked encryption and decryption through the remote
//! key-custody service.
//!
//! # Ciphertext layout
//!
//! ```text
//! <base64(block 0 ciphertext)><base64(block 1 ciphertext)>...
//! ```
//!
//! Each ciphertext block is exactly `decrypt_block_size` characters of
//! unpadded base64 and blocks are concatenated without delimiters, so
//! decryption re-splits purely by length.
//!
//! # Scheduling
//!
//! Blocks are processed strictly in order, one remote call in flight at a
//! time. The first failure aborts the call and discards every block already
//! produced.

use std::sync::Arc;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use bytes::{Bytes, BytesMut};
use common::protocol::{KeyOperationResult, KeyOperationsParameters};
use common::{EncryptionAlgorithm, RemoteError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blocks::blocks;
use crate::config::AdapterConfig;
use crate::error::{CipherError, ConfigError};
use crate::key_ref::KeyReference;
use crate::metadata::KeyMetadata;
use crate::profile::AlgorithmProfile;
use crate::remote::RemoteCipher;

/// Standard alphabet, unpadded on output; accepts padded or unpadded input.
const BLOCK_TEXT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encrypts and decrypts arbitrary-length payloads with one remote RSA key.
///
/// Holds no mutable state; concurrent calls on a shared adapter are safe and
/// are limited only by the remote collaborator.
#[derive(Clone)]
pub struct CipherAdapter {
    remote: Arc<dyn RemoteCipher>,
    key: KeyReference,
    profile: AlgorithmProfile,
}

impl std::fmt::Debug for CipherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherAdapter")
            .field("key", &self.key)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl CipherAdapter {
    /// Build an adapter using the default algorithm (RSA PKCS#1 v1.5).
    ///
    /// # Errors
    ///
    /// See [`CipherAdapter::create_with_algorithm`].
    pub fn create(
        identifier: &str,
        remote: Option<Arc<dyn RemoteCipher>>,
        metadata: &KeyMetadata,
    ) -> Result<Self, ConfigError> {
        Self::create_with_algorithm(identifier, remote, metadata, EncryptionAlgorithm::default())
    }

    /// Build an adapter for the key named by `identifier`.
    ///
    /// `metadata` must describe that key; it is validated here and the block
    /// sizes are derived from its modulus size.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingClient`] if `remote` is `None`.
    /// - [`ConfigError::Identifier`] if `identifier` does not parse.
    /// - [`ConfigError::KeyUnsuitable`] / [`ConfigError::UnsupportedKeySize`]
    ///   if the key fails validation.
    pub fn create_with_algorithm(
        identifier: &str,
        remote: Option<Arc<dyn RemoteCipher>>,
        metadata: &KeyMetadata,
        algorithm: EncryptionAlgorithm,
    ) -> Result<Self, ConfigError> {
        let remote = remote.ok_or(ConfigError::MissingClient)?;
        let key = KeyReference::parse(identifier)?;
        metadata.validate()?;

        let profile = AlgorithmProfile::compute(algorithm, metadata.key_size_bits);
        info!(
            vault = key.vault_location(),
            key_name = key.key_name(),
            key_version = key.key_version(),
            algorithm = %algorithm,
            key_size_bits = profile.key_size_bits(),
            encrypt_block_size = profile.encrypt_block_size(),
            decrypt_block_size = profile.decrypt_block_size(),
            "cipher adapter ready"
        );

        Ok(Self {
            remote,
            key,
            profile,
        })
    }

    /// Fetch the key's metadata from `remote`, validate it, and build an adapter.
    ///
    /// # Errors
    ///
    /// As [`CipherAdapter::create_with_algorithm`], plus
    /// [`ConfigError::Metadata`] if the lookup fails and
    /// [`ConfigError::MalformedMetadata`] if the returned record is incomplete.
    pub async fn connect(
        identifier: &str,
        remote: Arc<dyn RemoteCipher>,
        algorithm: EncryptionAlgorithm,
    ) -> Result<Self, ConfigError> {
        let key = KeyReference::parse(identifier)?;
        let bundle = remote
            .key_metadata(&key)
            .await
            .map_err(ConfigError::Metadata)?;
        let metadata = KeyMetadata::try_from(bundle)?;

        Self::create_with_algorithm(identifier, Some(remote), &metadata, algorithm)
    }

    /// [`CipherAdapter::connect`] with the identifier and algorithm from `cfg`.
    pub async fn from_config(
        cfg: &AdapterConfig,
        remote: Arc<dyn RemoteCipher>,
    ) -> Result<Self, ConfigError> {
        Self::connect(&cfg.key_identifier, remote, cfg.algorithm).await
    }

    pub fn key(&self) -> &KeyReference {
        &self.key
    }

    pub fn profile(&self) -> &AlgorithmProfile {
        &self.profile
    }

    // -----------------------------------------------------------------------
    // Encrypt
    // -----------------------------------------------------------------------

    /// Encrypt `plaintext` of any length.
    ///
    /// Returns the concatenated base64 ciphertext blocks. An empty input
    /// returns an empty output without contacting the service.
    ///
    /// # Errors
    ///
    /// - [`CipherError::RemoteFailure`] if the service fails on any block.
    /// - [`CipherError::MalformedResponse`] if a returned block has the wrong length.
    pub async fn encrypt(&self, plaintext: &[u8]) -> Result<Bytes, CipherError> {
        self.encrypt_with_cancel(plaintext, &CancellationToken::new())
            .await
    }

    /// [`CipherAdapter::encrypt`], aborting with [`CipherError::Cancelled`]
    /// once `cancel` fires.
    pub async fn encrypt_with_cancel(
        &self,
        plaintext: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Bytes, CipherError> {
        let size = self.profile.encrypt_block_size();
        let mut out = BytesMut::with_capacity(
            plaintext.len().div_ceil(size) * self.profile.decrypt_block_size(),
        );

        for (index, block) in blocks(plaintext, size).enumerate() {
            self.encrypt_block(index, block, cancel, &mut out)
                .await
                .inspect_err(|e| warn!(block = index, error = %e, "encrypt aborted"))?;
        }
        debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = out.len(),
            "payload encrypted"
        );
        Ok(out.freeze())
    }

    async fn encrypt_block(
        &self,
        index: usize,
        block: &[u8],
        cancel: &CancellationToken,
        out: &mut BytesMut,
    ) -> Result<(), CipherError> {
        if block.is_empty() {
            return Ok(());
        }

        let params = KeyOperationsParameters::new(self.profile.algorithm(), BLOCK_TEXT.encode(block));
        let result = self
            .dispatch(index, cancel, || self.remote.encrypt_block(&self.key, params))
            .await?;

        if result.value.len() != self.profile.decrypt_block_size() {
            return Err(CipherError::MalformedResponse { block_index: index });
        }
        debug!(block = index, len = block.len(), "block encrypted");
        out.extend_from_slice(result.value.as_bytes());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Decrypt
    // -----------------------------------------------------------------------

    /// Decrypt output previously produced by [`CipherAdapter::encrypt`] with
    /// the same key.
    ///
    /// # Errors
    ///
    /// - [`CipherError::MalformedCiphertext`] if a block is not ASCII text.
    /// - [`CipherError::RemoteFailure`] if the service fails on any block.
    /// - [`CipherError::MalformedResponse`] if a returned block is not base64.
    pub async fn decrypt(&self, ciphertext: &[u8]) -> Result<Bytes, CipherError> {
        self.decrypt_with_cancel(ciphertext, &CancellationToken::new())
            .await
    }

    /// [`CipherAdapter::decrypt`], aborting with [`CipherError::Cancelled`]
    /// once `cancel` fires.
    pub async fn decrypt_with_cancel(
        &self,
        ciphertext: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Bytes, CipherError> {
        let size = self.profile.decrypt_block_size();
        let mut out = BytesMut::with_capacity(
            ciphertext.len().div_ceil(size) * self.profile.encrypt_block_size(),
        );

        for (index, block) in blocks(ciphertext, size).enumerate() {
            self.decrypt_block(index, block, cancel, &mut out)
                .await
                .inspect_err(|e| warn!(block = index, error = %e, "decrypt aborted"))?;
        }
        debug!(
            ciphertext_len = ciphertext.len(),
            plaintext_len = out.len(),
            "payload decrypted"
        );
        Ok(out.freeze())
    }

    async fn decrypt_block(
        &self,
        index: usize,
        block: &[u8],
        cancel: &CancellationToken,
        out: &mut BytesMut,
    ) -> Result<(), CipherError> {
        if block.is_empty() {
            return Ok(());
        }

        let text = std::str::from_utf8(block)
            .ok()
            .filter(|s| s.is_ascii())
            .ok_or(CipherError::MalformedCiphertext { block_index: index })?;
        let params = KeyOperationsParameters::new(self.profile.algorithm(), text);
        let result = self
            .dispatch(index, cancel, || self.remote.decrypt_block(&self.key, params))
            .await?;

        let plaintext = BLOCK_TEXT
            .decode(result.value.as_bytes())
            .map_err(|_| CipherError::MalformedResponse { block_index: index })?;
        debug!(block = index, len = plaintext.len(), "block decrypted");
        out.extend_from_slice(&plaintext);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Remote dispatch
    // -----------------------------------------------------------------------

    /// Issue one remote call for block `index`, racing it against `cancel`.
    ///
    /// The call is not started at all if `cancel` has already fired.
    async fn dispatch<F, Fut>(
        &self,
        index: usize,
        cancel: &CancellationToken,
        call: F,
    ) -> Result<KeyOperationResult, CipherError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<KeyOperationResult, RemoteError>>,
    {
        if cancel.is_cancelled() {
            return Err(CipherError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CipherError::Cancelled),
            result = call() => result.map_err(|cause| CipherError::RemoteFailure {
                block_index: index,
                cause,
            }),
        }
    }
}
