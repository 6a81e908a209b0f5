//! Public-pool and staking transaction records

use poseidon_hash::Goldilocks;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::Result;
use crate::hashing::ElementBuilder;

use super::{check_enum, check_range, validate_header, TxInfo};

// =============================================================================
// CreatePublicPool
// =============================================================================

#[derive(Debug, Clone)]
pub struct CreatePublicPoolTxReq {
    pub operator_fee: i64,
    pub initial_total_shares: i64,
    pub min_operator_share_rate: i64,
}

/// Signed CreatePublicPool record (tx type 10, 9 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreatePublicPoolTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub operator_fee: i64,
    pub initial_total_shares: i64,
    pub min_operator_share_rate: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for CreatePublicPoolTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_PUBLIC_POOL
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        check_range("operator fee", self.operator_fee, 0, MAX_OPERATOR_FEE)?;
        check_range(
            "initial total shares",
            self.initial_total_shares,
            MIN_SHARE_AMOUNT,
            MAX_SHARE_AMOUNT,
        )?;
        check_range(
            "min operator share rate",
            self.min_operator_share_rate,
            0,
            MAX_SHARE_RATE,
        )
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_i64(self.operator_fee);
        builder.push_i64(self.initial_total_shares);
        builder.push_i64(self.min_operator_share_rate);
        builder.into_elements()
    }

    fn tx_info(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn tx_hash(&self) -> Option<&str> {
        self.signed_hash.as_deref()
    }

    fn attach_signature(&mut self, sig: String, signed_hash: String) {
        self.sig = Some(sig);
        self.signed_hash = Some(signed_hash);
    }
}

// =============================================================================
// UpdatePublicPool
// =============================================================================

#[derive(Debug, Clone)]
pub struct UpdatePublicPoolTxReq {
    pub public_pool_index: i64,
    pub status: u8,
    pub operator_fee: i64,
    pub min_operator_share_rate: i64,
}

/// Signed UpdatePublicPool record (tx type 11, 10 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdatePublicPoolTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub public_pool_index: i64,
    pub status: u8,
    pub operator_fee: i64,
    pub min_operator_share_rate: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for UpdatePublicPoolTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_UPDATE_PUBLIC_POOL
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        check_range(
            "public pool index",
            self.public_pool_index,
            MIN_ACCOUNT_INDEX,
            MAX_ACCOUNT_INDEX,
        )?;
        check_enum("pool status", self.status, POOL_STATUS_FROZEN)?;
        check_range("operator fee", self.operator_fee, 0, MAX_OPERATOR_FEE)?;
        check_range(
            "min operator share rate",
            self.min_operator_share_rate,
            0,
            MAX_SHARE_RATE,
        )
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_i64(self.public_pool_index);
        builder.push_u64(self.status as u64);
        builder.push_i64(self.operator_fee);
        builder.push_i64(self.min_operator_share_rate);
        builder.into_elements()
    }

    fn tx_info(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn tx_hash(&self) -> Option<&str> {
        self.signed_hash.as_deref()
    }

    fn attach_signature(&mut self, sig: String, signed_hash: String) {
        self.sig = Some(sig);
        self.signed_hash = Some(signed_hash);
    }
}

// =============================================================================
// MintShares / BurnShares
// =============================================================================

#[derive(Debug, Clone)]
pub struct MintSharesTxReq {
    pub public_pool_index: i64,
    pub share_amount: i64,
}

#[derive(Debug, Clone)]
pub struct BurnSharesTxReq {
    pub public_pool_index: i64,
    pub share_amount: i64,
}

/// Signed MintShares record (tx type 18, 8 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MintSharesTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub public_pool_index: i64,
    pub share_amount: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

/// Signed BurnShares record (tx type 19, 8 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BurnSharesTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub public_pool_index: i64,
    pub share_amount: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

fn validate_share_move(
    account_index: i64,
    api_key_index: u8,
    nonce: i64,
    expired_at: i64,
    public_pool_index: i64,
    share_amount: i64,
) -> Result<()> {
    validate_header(account_index, api_key_index, nonce, expired_at)?;
    check_range(
        "public pool index",
        public_pool_index,
        MIN_ACCOUNT_INDEX,
        MAX_ACCOUNT_INDEX,
    )?;
    check_range("share amount", share_amount, MIN_SHARE_AMOUNT, MAX_SHARE_AMOUNT)
}

fn share_move_elements(
    chain_id: u32,
    tx_type: u8,
    account_index: i64,
    api_key_index: u8,
    nonce: i64,
    expired_at: i64,
    pool_index: i64,
    share_amount: i64,
) -> Vec<Goldilocks> {
    let mut builder = ElementBuilder::with_prologue(chain_id, tx_type, nonce, expired_at);
    builder.push_i64(account_index);
    builder.push_u64(api_key_index as u64);
    builder.push_i64(pool_index);
    builder.push_i64(share_amount);
    builder.into_elements()
}

impl TxInfo for MintSharesTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_MINT_SHARES
    }

    fn validate(&self) -> Result<()> {
        validate_share_move(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.public_pool_index,
            self.share_amount,
        )
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        share_move_elements(
            chain_id,
            self.tx_type(),
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.public_pool_index,
            self.share_amount,
        )
    }

    fn tx_info(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn tx_hash(&self) -> Option<&str> {
        self.signed_hash.as_deref()
    }

    fn attach_signature(&mut self, sig: String, signed_hash: String) {
        self.sig = Some(sig);
        self.signed_hash = Some(signed_hash);
    }
}

impl TxInfo for BurnSharesTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_BURN_SHARES
    }

    fn validate(&self) -> Result<()> {
        validate_share_move(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.public_pool_index,
            self.share_amount,
        )
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        share_move_elements(
            chain_id,
            self.tx_type(),
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.public_pool_index,
            self.share_amount,
        )
    }

    fn tx_info(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn tx_hash(&self) -> Option<&str> {
        self.signed_hash.as_deref()
    }

    fn attach_signature(&mut self, sig: String, signed_hash: String) {
        self.sig = Some(sig);
        self.signed_hash = Some(signed_hash);
    }
}

// =============================================================================
// StakeAssets / UnstakeAssets
// =============================================================================

#[derive(Debug, Clone)]
pub struct StakeAssetsTxReq {
    pub staking_pool_index: i64,
    pub share_amount: i64,
}

#[derive(Debug, Clone)]
pub struct UnstakeAssetsTxReq {
    pub staking_pool_index: i64,
    pub share_amount: i64,
}

/// Signed StakeAssets record (tx type 30, 8 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StakeAssetsTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub staking_pool_index: i64,
    pub share_amount: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

/// Signed UnstakeAssets record (tx type 31, 8 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UnstakeAssetsTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub staking_pool_index: i64,
    pub share_amount: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

fn validate_stake_move(
    account_index: i64,
    api_key_index: u8,
    nonce: i64,
    expired_at: i64,
    staking_pool_index: i64,
    share_amount: i64,
) -> Result<()> {
    validate_header(account_index, api_key_index, nonce, expired_at)?;
    check_range("staking pool index", staking_pool_index, 0, MAX_ACCOUNT_INDEX)?;
    check_range("share amount", share_amount, MIN_SHARE_AMOUNT, MAX_SHARE_AMOUNT)
}

impl TxInfo for StakeAssetsTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_STAKE_ASSETS
    }

    fn validate(&self) -> Result<()> {
        validate_stake_move(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.staking_pool_index,
            self.share_amount,
        )
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        share_move_elements(
            chain_id,
            self.tx_type(),
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.staking_pool_index,
            self.share_amount,
        )
    }

    fn tx_info(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn tx_hash(&self) -> Option<&str> {
        self.signed_hash.as_deref()
    }

    fn attach_signature(&mut self, sig: String, signed_hash: String) {
        self.sig = Some(sig);
        self.signed_hash = Some(signed_hash);
    }
}

impl TxInfo for UnstakeAssetsTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_UNSTAKE_ASSETS
    }

    fn validate(&self) -> Result<()> {
        validate_stake_move(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.staking_pool_index,
            self.share_amount,
        )
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        share_move_elements(
            chain_id,
            self.tx_type(),
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
            self.staking_pool_index,
            self.share_amount,
        )
    }

    fn tx_info(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn tx_hash(&self) -> Option<&str> {
        self.signed_hash.as_deref()
    }

    fn attach_signature(&mut self, sig: String, signed_hash: String) {
        self.sig = Some(sig);
        self.signed_hash = Some(signed_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_public_pool_bounds() {
        let mut tx = CreatePublicPoolTxInfo {
            account_index: 42,
            api_key_index: 0,
            operator_fee: 500,
            initial_total_shares: 1_000_000,
            min_operator_share_rate: 100,
            expired_at: 1_000_000,
            nonce: 0,
            sig: None,
            signed_hash: None,
        };
        assert!(tx.validate().is_ok());
        assert_eq!(tx.canonical_elements(304).len(), 9);

        tx.operator_fee = MAX_OPERATOR_FEE + 1;
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_update_public_pool_status_membership() {
        let mut tx = UpdatePublicPoolTxInfo {
            account_index: 42,
            api_key_index: 0,
            public_pool_index: 77,
            status: POOL_STATUS_ACTIVE,
            operator_fee: 500,
            min_operator_share_rate: 100,
            expired_at: 1_000_000,
            nonce: 1,
            sig: None,
            signed_hash: None,
        };
        assert!(tx.validate().is_ok());
        assert_eq!(tx.canonical_elements(304).len(), 10);

        tx.status = 3;
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_share_moves_reject_zero_amount() {
        let mint = MintSharesTxInfo {
            account_index: 42,
            api_key_index: 0,
            public_pool_index: 77,
            share_amount: 0,
            expired_at: 1_000_000,
            nonce: 1,
            sig: None,
            signed_hash: None,
        };
        assert!(mint.validate().is_err());

        let burn = BurnSharesTxInfo {
            account_index: 42,
            api_key_index: 0,
            public_pool_index: 77,
            share_amount: 10,
            expired_at: 1_000_000,
            nonce: 1,
            sig: None,
            signed_hash: None,
        };
        assert!(burn.validate().is_ok());
        assert_eq!(burn.canonical_elements(304).len(), 8);
    }

    #[test]
    fn test_stake_and_unstake_share_layout() {
        let stake = StakeAssetsTxInfo {
            account_index: 42,
            api_key_index: 0,
            staking_pool_index: 3,
            share_amount: 10,
            expired_at: 1_000_000,
            nonce: 1,
            sig: None,
            signed_hash: None,
        };
        let unstake = UnstakeAssetsTxInfo {
            account_index: 42,
            api_key_index: 0,
            staking_pool_index: 3,
            share_amount: 10,
            expired_at: 1_000_000,
            nonce: 1,
            sig: None,
            signed_hash: None,
        };
        assert!(stake.validate().is_ok());
        assert!(unstake.validate().is_ok());

        // identical payloads with different tx types must hash differently
        let a: Vec<u64> = stake
            .canonical_elements(304)
            .iter()
            .map(|e| e.to_canonical_u64())
            .collect();
        let b: Vec<u64> = unstake
            .canonical_elements(304)
            .iter()
            .map(|e| e.to_canonical_u64())
            .collect();
        assert_ne!(a, b);
        assert_eq!(a[1], TX_TYPE_STAKE_ASSETS as u64);
        assert_eq!(b[1], TX_TYPE_UNSTAKE_ASSETS as u64);
    }
}
