//! Block-size arithmetic for RSA padding schemes.
//!
//! The custody service encrypts at most one RSA block per call. How many
//! plaintext bytes fit in that block depends on the padding overhead of the
//! scheme; the ciphertext of one block is always `k/8` bytes, returned as
//! unpadded base64 text.

use common::EncryptionAlgorithm;

/// Key sizes the adapter accepts.
pub const SUPPORTED_KEY_SIZES: [usize; 3] = [2048, 3072, 4096];

/// Padding overhead in bytes reserved by each scheme within one RSA block.
///
/// PKCS#1 v1.5 needs 11 bytes; OAEP needs `2 * hLen + 2`.
pub fn padding_overhead(algorithm: EncryptionAlgorithm) -> usize {
    match algorithm {
        EncryptionAlgorithm::Rsa15 => 11,
        EncryptionAlgorithm::RsaOaep => 2 * 20 + 2,
        EncryptionAlgorithm::RsaOaep256 => 2 * 32 + 2,
    }
}

/// Derived per-call block sizes for an algorithm and key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmProfile {
    algorithm: EncryptionAlgorithm,
    key_size_bits: usize,
    encrypt_block_size: usize,
    decrypt_block_size: usize,
}

impl AlgorithmProfile {
    /// Compute the profile for `algorithm` with a `key_size_bits` RSA key.
    ///
    /// Pure arithmetic; unsupported key sizes are rejected by the adapter,
    /// not here. A key too small for the padding yields an encrypt block
    /// size of zero.
    pub fn compute(algorithm: EncryptionAlgorithm, key_size_bits: usize) -> Self {
        Self {
            algorithm,
            key_size_bits,
            encrypt_block_size: (key_size_bits / 8).saturating_sub(padding_overhead(algorithm)),
            // 6 bits per base64 character, no padding.
            decrypt_block_size: key_size_bits.div_ceil(6),
        }
    }

    pub fn algorithm(&self) -> EncryptionAlgorithm {
        self.algorithm
    }

    pub fn key_size_bits(&self) -> usize {
        self.key_size_bits
    }

    /// Maximum plaintext bytes delivered in one remote encrypt call.
    pub fn encrypt_block_size(&self) -> usize {
        self.encrypt_block_size
    }

    /// Base64 characters of one ciphertext block, consumed per remote decrypt call.
    pub fn decrypt_block_size(&self) -> usize {
        self.decrypt_block_size
    }
}
