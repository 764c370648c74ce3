//! In-process stand-in for the custody service.
//!
//! [`FakeVault`] behaves like an RSA oracle as far as the adapter can tell:
//! it enforces the per-call plaintext limit of the requested padding scheme,
//! returns exactly `k/8` ciphertext bytes per block, and inverts its own
//! output. The transform is a SHA-256 keystream over a length-prefixed block.

use std::sync::Mutex;

use async_trait::async_trait;
use base64::{
    engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
    Engine as _,
};
use common::protocol::{
    JsonWebKey, KeyAttributes, KeyBundle, KeyOperationResult, KeyOperationsParameters,
};
use common::RemoteError;
use sha2::{Digest, Sha256};

use crate::key_ref::KeyReference;
use crate::metadata::{KeyMetadata, KeyType};
use crate::profile::AlgorithmProfile;
use crate::remote::RemoteCipher;

pub const KEY_ID: &str = "https://kv1.vault.example.net/keys/myKey/abc123";

/// Metadata of a usable RSA key of `bits` bits.
pub fn rsa_metadata(bits: usize) -> KeyMetadata {
    KeyMetadata {
        key_type: KeyType::Rsa,
        key_size_bits: bits,
        enabled: true,
        permitted_operations: vec!["encrypt".into(), "decrypt".into(), "sign".into()],
    }
}

/// One remote call observed by [`FakeVault`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Encrypt with this many plaintext bytes.
    Encrypt(usize),
    /// Decrypt with this many ciphertext characters.
    Decrypt(usize),
}

pub struct FakeVault {
    bits: usize,
    seed: [u8; 32],
    /// Calls at or beyond this index never complete.
    stall_from: Option<usize>,
    calls: Mutex<Vec<Call>>,
}

impl FakeVault {
    pub fn new(bits: usize) -> Self {
        Self {
            bits,
            seed: Sha256::digest(b"fake-vault").into(),
            stall_from: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn stalling_from(mut self, call: usize) -> Self {
        self.stall_from = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn block_len(&self) -> usize {
        self.bits / 8
    }

    fn keystream(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.block_len() + 32);
        let mut counter = 0u32;
        while out.len() < self.block_len() {
            let mut h = Sha256::new();
            h.update(self.seed);
            h.update(counter.to_be_bytes());
            out.extend_from_slice(&h.finalize());
            counter += 1;
        }
        out.truncate(self.block_len());
        out
    }

    fn xor(&self, buf: &mut [u8]) {
        for (b, k) in buf.iter_mut().zip(self.keystream()) {
            *b ^= k;
        }
    }

    async fn record(&self, call: Call) {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len() - 1
        };
        if self.stall_from.is_some_and(|from| index >= from) {
            std::future::pending::<()>().await;
        }
    }

    fn result(value: String) -> KeyOperationResult {
        KeyOperationResult {
            kid: Some(KEY_ID.into()),
            value,
        }
    }
}

#[async_trait]
impl RemoteCipher for FakeVault {
    async fn encrypt_block(
        &self,
        _key: &KeyReference,
        params: KeyOperationsParameters,
    ) -> Result<KeyOperationResult, RemoteError> {
        let plain = STANDARD_NO_PAD
            .decode(&params.value)
            .map_err(|e| RemoteError::Rejected(format!("value is not base64: {e}")))?;
        self.record(Call::Encrypt(plain.len())).await;

        let max = AlgorithmProfile::compute(params.alg, self.bits).encrypt_block_size();
        if plain.len() > max {
            return Err(RemoteError::Rejected(format!(
                "{} bytes exceeds the {max}-byte limit of {}",
                plain.len(),
                params.alg
            )));
        }

        let mut block = vec![0u8; self.block_len()];
        block[..2].copy_from_slice(&(plain.len() as u16).to_be_bytes());
        block[2..2 + plain.len()].copy_from_slice(&plain);
        self.xor(&mut block);
        Ok(Self::result(STANDARD_NO_PAD.encode(block)))
    }

    async fn decrypt_block(
        &self,
        _key: &KeyReference,
        params: KeyOperationsParameters,
    ) -> Result<KeyOperationResult, RemoteError> {
        self.record(Call::Decrypt(params.value.len())).await;
        let mut block = STANDARD_NO_PAD
            .decode(&params.value)
            .map_err(|e| RemoteError::Rejected(format!("value is not base64: {e}")))?;
        if block.len() != self.block_len() {
            return Err(RemoteError::Rejected(format!(
                "ciphertext must be {} bytes, got {}",
                self.block_len(),
                block.len()
            )));
        }

        self.xor(&mut block);
        let len = u16::from_be_bytes([block[0], block[1]]) as usize;
        if len > self.block_len() - 2 {
            return Err(RemoteError::Rejected("decryption error".into()));
        }
        Ok(Self::result(STANDARD_NO_PAD.encode(&block[2..2 + len])))
    }

    async fn key_metadata(&self, _key: &KeyReference) -> Result<KeyBundle, RemoteError> {
        let mut modulus = vec![0xB7u8; self.block_len()];
        modulus[self.block_len() - 1] |= 1;
        Ok(KeyBundle {
            key: Some(JsonWebKey {
                kid: Some(KEY_ID.into()),
                kty: Some("RSA".into()),
                key_ops: Some(vec!["encrypt".into(), "decrypt".into()]),
                n: Some(URL_SAFE_NO_PAD.encode(modulus)),
                e: Some("AQAB".into()),
            }),
            attributes: Some(KeyAttributes {
                enabled: Some(true),
            }),
        })
    }
}
