//! Transaction record types
//!
//! One record type per exchange operation. Each record validates its own
//! fields, produces the canonical Goldilocks element vector that gets
//! hashed and signed, and serializes to the exchange's wire JSON with
//! exact, case-sensitive field names.

mod orders;
mod pools;
mod transfers;

pub use orders::{
    CancelAllOrdersTxInfo, CancelAllOrdersTxReq, CancelOrderTxInfo, CancelOrderTxReq,
    CreateGroupedOrdersTxInfo, CreateGroupedOrdersTxReq, CreateOrderTxInfo, CreateOrderTxReq,
    ModifyOrderTxInfo, ModifyOrderTxReq,
};
pub use pools::{
    BurnSharesTxInfo, BurnSharesTxReq, CreatePublicPoolTxInfo, CreatePublicPoolTxReq,
    MintSharesTxInfo, MintSharesTxReq, StakeAssetsTxInfo, StakeAssetsTxReq,
    UnstakeAssetsTxInfo, UnstakeAssetsTxReq, UpdatePublicPoolTxInfo, UpdatePublicPoolTxReq,
};
pub use transfers::{
    ChangePubKeyTxInfo, ChangePubKeyTxReq, CreateSubAccountTxInfo, TransferTxInfo, TransferTxReq,
    UpdateLeverageTxInfo, UpdateLeverageTxReq, UpdateMarginTxInfo, UpdateMarginTxReq,
    WithdrawTxInfo, WithdrawTxReq,
};

use base64::Engine;
use poseidon_hash::Goldilocks;

use crate::constants::*;
use crate::errors::{LighterError, Result};
use crate::hashing;
use crate::signer::KeyManager;

/// Behaviour shared by every transaction record.
pub trait TxInfo {
    /// Wire byte identifying the operation.
    fn tx_type(&self) -> u8;

    /// Enforce numeric bounds and enum membership. A record that fails
    /// validation is never hashed or signed.
    fn validate(&self) -> Result<()>;

    /// The ordered field-element vector that is hashed: the fixed
    /// prologue, the account/api-key header, then the variant payload.
    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks>;

    /// Wire JSON for the `tx_info` submission parameter.
    fn tx_info(&self) -> Result<String>;

    /// Hex digest once the record has been signed.
    fn tx_hash(&self) -> Option<&str>;

    /// Attach the signature and digest produced by the signing pipeline.
    fn attach_signature(&mut self, sig: String, signed_hash: String);
}

/// Validate, hash and sign a record in place.
///
/// Failures short-circuit unchanged: a validation error means the record
/// was never hashed, and the signature/digest fields stay empty.
pub fn sign_tx<T: TxInfo>(tx: &mut T, chain_id: u32, key_manager: &KeyManager) -> Result<()> {
    tx.validate()?;
    let digest = hashing::digest(&tx.canonical_elements(chain_id));
    let signature = key_manager.sign(&digest)?;
    tx.attach_signature(
        base64::engine::general_purpose::STANDARD.encode(signature),
        hex::encode(digest),
    );
    Ok(())
}

// =============================================================================
// Transaction Options
// =============================================================================

/// Optional per-transaction overrides.
///
/// Fields left unset are filled by the owning client; standalone
/// construction requires account, api key and nonce to be present.
/// A nonce of `-1` counts as unset.
#[derive(Debug, Clone, Default)]
pub struct TransactOpts {
    pub from_account_index: Option<i64>,
    pub api_key_index: Option<u8>,
    pub expired_at: Option<i64>,
    pub nonce: Option<i64>,
}

/// Fully resolved header values ready to drop into a record.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedOpts {
    pub account_index: i64,
    pub api_key_index: u8,
    pub expired_at: i64,
    pub nonce: i64,
}

impl TransactOpts {
    /// Resolve options without a client. Account, api key and nonce have
    /// no defaults here and must be supplied; expiry falls back to
    /// `now + 10 minutes`.
    pub fn resolve_standalone(&self, now_ms: i64) -> Result<ResolvedOpts> {
        let account_index = self
            .from_account_index
            .ok_or(LighterError::MissingOpt("FromAccountIndex"))?;
        let api_key_index = self
            .api_key_index
            .ok_or(LighterError::MissingOpt("ApiKeyIndex"))?;
        let nonce = match self.nonce {
            Some(nonce) if nonce >= MIN_NONCE => nonce,
            _ => return Err(LighterError::MissingOpt("Nonce")),
        };
        let expired_at = self
            .expired_at
            .unwrap_or(now_ms + DEFAULT_TX_EXPIRY_MS);
        Ok(ResolvedOpts {
            account_index,
            api_key_index,
            expired_at,
            nonce,
        })
    }
}

// =============================================================================
// Shared Validation Helpers
// =============================================================================

pub(crate) fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(LighterError::FieldOutOfRange { field, value });
    }
    Ok(())
}

pub(crate) fn check_enum(field: &'static str, value: u8, max: u8) -> Result<()> {
    if value > max {
        return Err(LighterError::FieldOutOfRange {
            field,
            value: value as i64,
        });
    }
    Ok(())
}

/// Bounds common to every record header.
pub(crate) fn validate_header(
    account_index: i64,
    api_key_index: u8,
    nonce: i64,
    expired_at: i64,
) -> Result<()> {
    check_range(
        "account index",
        account_index,
        MIN_ACCOUNT_INDEX,
        MAX_ACCOUNT_INDEX,
    )?;
    if api_key_index > MAX_API_KEY_INDEX {
        return Err(LighterError::FieldOutOfRange {
            field: "api key index",
            value: api_key_index as i64,
        });
    }
    check_range("nonce", nonce, MIN_NONCE, i64::MAX)?;
    check_range("expired at", expired_at, 0, MAX_TIMESTAMP_MS)?;
    Ok(())
}

/// Serialize byte blobs as lowercase hex strings on the wire.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_standalone_requires_account() {
        let opts = TransactOpts {
            api_key_index: Some(0),
            nonce: Some(1),
            ..Default::default()
        };
        let err = opts.resolve_standalone(0).unwrap_err();
        assert!(matches!(err, LighterError::MissingOpt("FromAccountIndex")));
    }

    #[test]
    fn test_resolve_standalone_nil_nonce_is_absent() {
        let opts = TransactOpts {
            from_account_index: Some(42),
            api_key_index: Some(0),
            nonce: Some(NIL_NONCE),
            ..Default::default()
        };
        let err = opts.resolve_standalone(0).unwrap_err();
        assert!(matches!(err, LighterError::MissingOpt("Nonce")));
    }

    #[test]
    fn test_resolve_standalone_zero_nonce_accepted() {
        let opts = TransactOpts {
            from_account_index: Some(42),
            api_key_index: Some(0),
            nonce: Some(0),
            ..Default::default()
        };
        let resolved = opts.resolve_standalone(1_000).unwrap();
        assert_eq!(resolved.nonce, 0);
        assert_eq!(resolved.expired_at, 1_000 + DEFAULT_TX_EXPIRY_MS);
    }

    #[test]
    fn test_validate_header_bounds() {
        assert!(validate_header(1, 0, 0, 0).is_ok());
        assert!(validate_header(MAX_ACCOUNT_INDEX, 253, 0, MAX_TIMESTAMP_MS).is_ok());
        assert!(validate_header(0, 0, 0, 0).is_err());
        assert!(validate_header(MAX_ACCOUNT_INDEX + 1, 0, 0, 0).is_err());
        assert!(validate_header(1, 254, 0, 0).is_err());
        assert!(validate_header(1, 0, -1, 0).is_err());
        assert!(validate_header(1, 0, 0, MAX_TIMESTAMP_MS + 1).is_err());
    }
}
