//! Transfer, withdrawal, account and margin transaction records
//!
//! Transfer and ChangePubKey additionally carry a human-readable
//! MessageToSign for the caller's L1 countersignature; that string is
//! never part of the field-element hash.

use poseidon_hash::Goldilocks;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::{LighterError, Result};
use crate::hashing::ElementBuilder;

use super::{check_enum, check_range, hex_bytes, validate_header, TxInfo};

// =============================================================================
// Transfer
// =============================================================================

#[derive(Debug, Clone)]
pub struct TransferTxReq {
    pub to_account_index: i64,
    pub usdc_amount: i64,
    pub fee: i64,
    /// Opaque 32-byte memo; shorter or longer blobs fail validation.
    pub memo: Vec<u8>,
}

/// Signed Transfer record (tx type 12, 13 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub to_account_index: i64,
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: i64,
    pub fee: i64,
    #[serde(with = "hex_bytes")]
    pub memo: Vec<u8>,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_to_sign: Option<String>,
}

impl TransferTxInfo {
    /// The L1 payload the caller countersigns with their Ethereum key.
    pub fn build_message_to_sign(&self) -> String {
        format!(
            "Transfer {} USDC to account {} (fee {}). Nonce: {}",
            self.usdc_amount, self.to_account_index, self.fee, self.nonce
        )
    }
}

impl TxInfo for TransferTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_TRANSFER
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        check_range(
            "to account index",
            self.to_account_index,
            MIN_ACCOUNT_INDEX,
            MAX_ACCOUNT_INDEX,
        )?;
        check_range(
            "transfer amount",
            self.usdc_amount,
            MIN_TRANSFER_AMOUNT,
            MAX_TRANSFER_AMOUNT,
        )?;
        check_range("transfer fee", self.fee, 0, MAX_TRANSFER_AMOUNT)?;
        if self.memo.len() != MEMO_LENGTH {
            return Err(LighterError::PayloadLength {
                field: "memo",
                expected: "32 bytes",
                actual: self.memo.len(),
            });
        }
        Ok(())
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_i64(self.to_account_index);
        builder.push_i64(self.usdc_amount);
        builder.push_i64(self.fee);
        builder.push_bytes(&self.memo);
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
// Withdraw
// =============================================================================

#[derive(Debug, Clone)]
pub struct WithdrawTxReq {
    pub usdc_amount: u64,
}

/// Signed Withdraw record (tx type 13, 7 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WithdrawTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: u64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for WithdrawTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_WITHDRAW
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        if self.usdc_amount < MIN_WITHDRAW_AMOUNT || self.usdc_amount > MAX_WITHDRAW_AMOUNT {
            return Err(LighterError::FieldOutOfRange {
                field: "withdraw amount",
                value: self.usdc_amount as i64,
            });
        }
        Ok(())
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_u64(self.usdc_amount);
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
// ChangePubKey
// =============================================================================

#[derive(Debug, Clone)]
pub struct ChangePubKeyTxReq {
    /// Encoded ecGFp5 public point, exactly 40 bytes.
    pub pub_key: Vec<u8>,
}

/// Signed L2 ChangePubKey record (tx type 8, 11 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangePubKeyTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    #[serde(with = "hex_bytes")]
    pub pub_key: Vec<u8>,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_to_sign: Option<String>,
}

impl ChangePubKeyTxInfo {
    /// The L1 payload the caller countersigns with their Ethereum key.
    pub fn build_message_to_sign(&self) -> String {
        format!(
            "Set zkLighter API key {} public key to 0x{}. Nonce: {}",
            self.api_key_index,
            hex::encode(&self.pub_key),
            self.nonce
        )
    }
}

impl TxInfo for ChangePubKeyTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CHANGE_PUB_KEY
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        if self.pub_key.len() != PUBLIC_KEY_LENGTH {
            return Err(LighterError::PayloadLength {
                field: "public key",
                expected: "40 bytes",
                actual: self.pub_key.len(),
            });
        }
        Ok(())
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_bytes(&self.pub_key);
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
// CreateSubAccount
// =============================================================================

/// Signed CreateSubAccount record (tx type 9, header only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSubAccountTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for CreateSubAccountTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_SUB_ACCOUNT
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
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
// UpdateLeverage
// =============================================================================

#[derive(Debug, Clone)]
pub struct UpdateLeverageTxReq {
    pub market_index: i16,
    /// Basis points; 10_000 / leverage.
    pub initial_margin_fraction: u16,
    pub margin_mode: u8,
}

/// Signed UpdateLeverage record (tx type 20, 9 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateLeverageTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: i16,
    pub initial_margin_fraction: u16,
    pub margin_mode: u8,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for UpdateLeverageTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_UPDATE_LEVERAGE
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        check_range(
            "market index",
            self.market_index as i64,
            MIN_MARKET_INDEX as i64,
            MAX_MARKET_INDEX as i64,
        )?;
        check_range(
            "initial margin fraction",
            self.initial_margin_fraction as i64,
            1,
            MAX_INITIAL_MARGIN_FRACTION as i64,
        )?;
        check_enum("margin mode", self.margin_mode, MARGIN_MODE_ISOLATED)
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_u64(self.market_index as u16 as u64);
        builder.push_u64(self.initial_margin_fraction as u64);
        builder.push_u64(self.margin_mode as u64);
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
// UpdateMargin
// =============================================================================

#[derive(Debug, Clone)]
pub struct UpdateMarginTxReq {
    pub market_index: i16,
    pub usdc_amount: i64,
    /// 0 removes from the isolated position, 1 adds to it.
    pub direction: u8,
}

/// Signed UpdateMargin record (tx type 29, 9 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateMarginTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: i16,
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: i64,
    pub direction: u8,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for UpdateMarginTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_UPDATE_MARGIN
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        check_range(
            "market index",
            self.market_index as i64,
            MIN_MARKET_INDEX as i64,
            MAX_MARKET_INDEX as i64,
        )?;
        check_range(
            "margin amount",
            self.usdc_amount,
            MIN_TRANSFER_AMOUNT,
            MAX_TRANSFER_AMOUNT,
        )?;
        check_enum("margin direction", self.direction, MARGIN_DIRECTION_ADD)
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_u64(self.market_index as u16 as u64);
        builder.push_i64(self.usdc_amount);
        builder.push_u64(self.direction as u64);
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
