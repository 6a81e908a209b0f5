//! Key management and Schnorr signing
//!
//! A KeyManager owns one ecGFp5 key pair and signs the 40-byte
//! Poseidon2 digests produced by the hashing module. Signing uses a
//! fresh random nonce per call and is safe for concurrent use; the key
//! pair is immutable once constructed.

use goldilocks_crypto::{schnorr::Point, ScalarField};

use crate::constants::{DIGEST_LENGTH, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::errors::{LighterError, Result};
use crate::hashing;

/// Holds a private scalar and the public point derived from it.
#[derive(Debug)]
pub struct KeyManager {
    private_key: ScalarField,
    public_key: [u8; PUBLIC_KEY_LENGTH],
}

impl KeyManager {
    /// Build a key manager from a raw 40-byte LE private scalar.
    pub fn from_bytes(private_key_bytes: &[u8]) -> Result<Self> {
        if private_key_bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(LighterError::InvalidKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LENGTH,
                private_key_bytes.len()
            )));
        }
        let private_key = ScalarField::from_bytes_le(private_key_bytes)
            .map_err(|e| LighterError::InvalidKey(format!("scalar not in field: {e}")))?;
        Ok(Self::from_scalar(private_key))
    }

    /// Build a key manager from a hex private key, `0x` prefix optional.
    pub fn from_private_key_hex(private_key_hex: &str) -> Result<Self> {
        let trimmed = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        let bytes = hex::decode(trimmed)
            .map_err(|e| LighterError::InvalidKey(format!("bad hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self::from_scalar(ScalarField::sample_crypto())
    }

    /// Derive a key pair deterministically from a 40-byte seed.
    pub fn from_seed(seed: &[u8; PRIVATE_KEY_LENGTH]) -> Result<Self> {
        Self::from_bytes(seed)
    }

    fn from_scalar(private_key: ScalarField) -> Self {
        let public_key = Point::generator().mul(&private_key).encode().to_bytes_le();
        Self {
            private_key,
            public_key,
        }
    }

    /// Public point, encoded as 40 LE bytes.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.public_key
    }

    /// Lowercase hex of the encoded public point.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// Private scalar, serialized as 40 LE bytes.
    pub fn private_key_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.private_key.to_bytes_le()
    }

    /// Schnorr-sign a 40-byte transaction digest.
    ///
    /// The signature is `s || e`, two 40-byte LE scalars. A fresh random
    /// nonce scalar is drawn per call, so signatures over the same digest
    /// differ while all verifying against the same public key.
    pub fn sign(&self, digest: &[u8; DIGEST_LENGTH]) -> Result<[u8; SIGNATURE_LENGTH]> {
        let nonce = ScalarField::sample_crypto();
        let signature = goldilocks_crypto::sign_hashed_message(
            &self.private_key.to_bytes_le(),
            digest,
            &nonce.to_bytes_le(),
        )?;
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(&signature);
        Ok(out)
    }

    /// Verify a signature over a digest against this key pair.
    pub fn verify(&self, digest: &[u8; DIGEST_LENGTH], signature: &[u8]) -> Result<bool> {
        Ok(goldilocks_crypto::verify_signature(
            signature,
            digest,
            &self.public_key,
        )?)
    }

    /// Build a `message:signature` auth token.
    ///
    /// The message is `"{deadline}:{account_index}:{api_key_index}"`
    /// (deadline in unix seconds); its ASCII bytes are packed as
    /// canonical LE limbs, hashed to a 40-byte digest and Schnorr-signed.
    pub fn auth_token(
        &self,
        deadline: i64,
        account_index: i64,
        api_key_index: u8,
    ) -> Result<String> {
        let message = format!("{deadline}:{account_index}:{api_key_index}");
        let digest = hashing::digest_bytes(message.as_bytes());
        let signature = self.sign(&digest)?;
        Ok(format!("{message}:{}", hex::encode(signature)))
    }
}

/// Verify a batch of (signature, digest) pairs against one public key.
///
/// Convenience for binding-layer tests that pin the signature encoding;
/// stops at the first failure.
pub fn verify_digests(
    key_manager: &KeyManager,
    pairs: &[([u8; DIGEST_LENGTH], Vec<u8>)],
) -> Result<bool> {
    for (digest, signature) in pairs {
        if !key_manager.verify(digest, signature)? {
            return Ok(false);
        }
    }
    Ok(true)
}
