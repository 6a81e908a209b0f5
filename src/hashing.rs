//! Canonical field-element packing and Poseidon2 digests
//!
//! Every transaction record is reduced to an ordered vector of
//! Goldilocks field elements before hashing. The element order and the
//! width mapping are part of the exchange protocol: a record packed in
//! a different order hashes to a different digest and is rejected (or
//! worse, accepted as a different transaction).
//!
//! Width mapping:
//! - `u8`/`u16`/`u32` and small enums: one element via unsigned
//!   zero-extension to 64 bits
//! - `i64`: one element via `Goldilocks::from_i64`
//! - byte blobs (memo, public key): consecutive 8-byte LE limbs, the
//!   final partial limb zero-padded on the high side

use poseidon_hash::{hash_to_quintic_extension, Goldilocks};

use crate::constants::DIGEST_LENGTH;

/// Builder for the ordered element vector of one transaction record.
///
/// Every record starts with the same 4-element prologue
/// (chain id, tx type, nonce, expiry) followed by the account index and
/// api key index, then the variant payload in declared order.
pub struct ElementBuilder {
    elements: Vec<Goldilocks>,
}

impl ElementBuilder {
    /// Start an element vector with the fixed transaction prologue.
    pub fn with_prologue(chain_id: u32, tx_type: u8, nonce: i64, expired_at: i64) -> Self {
        let mut builder = Self {
            elements: Vec::with_capacity(16),
        };
        builder.push_u64(chain_id as u64);
        builder.push_u64(tx_type as u64);
        builder.push_i64(nonce);
        builder.push_i64(expired_at);
        builder
    }

    /// Start an empty element vector (auth-token message packing).
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn push_u64(&mut self, value: u64) {
        self.elements.push(Goldilocks::from_canonical_u64(value));
    }

    /// Signed 64-bit values go through the field's sign-aware mapping.
    pub fn push_i64(&mut self, value: i64) {
        self.elements.push(Goldilocks::from_i64(value));
    }

    /// Pack a byte blob as consecutive 8-byte LE limbs, zero-padding the
    /// final partial limb on the high side.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut limb = [0u8; 8];
            limb[..chunk.len()].copy_from_slice(chunk);
            self.push_u64(u64::from_le_bytes(limb));
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_elements(self) -> Vec<Goldilocks> {
        self.elements
    }
}

impl Default for ElementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash an element vector into the 40-byte LE transaction digest.
///
/// The Poseidon2 sponge output is a quintic-extension element whose
/// 5 limbs serialize little-endian. The result doubles as the digest
/// handed to the Schnorr signer and, hex-encoded, as the SignedHash.
pub fn digest(elements: &[Goldilocks]) -> [u8; DIGEST_LENGTH] {
    hash_to_quintic_extension(elements).to_bytes_le()
}

/// Pack raw bytes as canonical LE limbs and digest them.
///
/// Used for the auth-token message, whose ASCII bytes are chunked the
/// same way byte blobs inside records are.
pub fn digest_bytes(bytes: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut builder = ElementBuilder::new();
    builder.push_bytes(bytes);
    digest(&builder.into_elements())
}
