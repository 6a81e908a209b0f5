//! Order transaction records
//!
//! CreateOrder, CreateGroupedOrders, CancelOrder, CancelAllOrders and
//! ModifyOrder. CreateOrder's ten payload fields are also inlined per
//! child inside a grouped-orders hash, so the packing lives in one place.

use poseidon_hash::Goldilocks;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::{LighterError, Result};
use crate::hashing::ElementBuilder;

use super::{check_enum, check_range, validate_header, TxInfo};

// =============================================================================
// CreateOrder
// =============================================================================

/// Payload accepted by the client's `create_order`.
#[derive(Debug, Clone)]
pub struct CreateOrderTxReq {
    pub market_index: i16,
    pub client_order_index: i64,
    pub base_amount: i64,
    pub price: u32,
    pub is_ask: u8,
    pub order_type: u8,
    pub time_in_force: u8,
    pub reduce_only: u8,
    pub trigger_price: u32,
    /// `-1` is replaced with `now + 28 days`; `0` means no expiry.
    pub order_expiry: i64,
}

/// Signed CreateOrder record (tx type 14, 16 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateOrderTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: i16,
    pub client_order_index: i64,
    pub base_amount: i64,
    pub price: u32,
    pub is_ask: u8,
    #[serde(rename = "Type")]
    pub order_type: u8,
    pub time_in_force: u8,
    pub reduce_only: u8,
    pub trigger_price: u32,
    pub order_expiry: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl CreateOrderTxInfo {
    pub(crate) fn from_req(req: &CreateOrderTxReq, resolved: super::ResolvedOpts) -> Self {
        Self {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            market_index: req.market_index,
            client_order_index: req.client_order_index,
            base_amount: req.base_amount,
            price: req.price,
            is_ask: req.is_ask,
            order_type: req.order_type,
            time_in_force: req.time_in_force,
            reduce_only: req.reduce_only,
            trigger_price: req.trigger_price,
            order_expiry: req.order_expiry,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        }
    }

    /// Payload bounds, shared with grouped-order children. OTOCO children
    /// carry the nil base-amount marker, which plain orders may not.
    pub(crate) fn validate_payload(&self, nil_base_allowed: bool) -> Result<()> {
        check_range(
            "market index",
            self.market_index as i64,
            MIN_MARKET_INDEX as i64,
            MAX_MARKET_INDEX as i64,
        )?;
        check_range("client order index", self.client_order_index, 0, i64::MAX)?;
        if !(nil_base_allowed && self.base_amount == NIL_ORDER_BASE_AMOUNT) {
            check_range("base amount", self.base_amount, MIN_BASE_AMOUNT, MAX_BASE_AMOUNT)?;
        }
        if self.price < MIN_ORDER_PRICE {
            return Err(LighterError::FieldOutOfRange {
                field: "price",
                value: self.price as i64,
            });
        }
        check_enum("is ask", self.is_ask, 1)?;
        check_enum("order type", self.order_type, ORDER_TYPE_TAKE_PROFIT_LIMIT)?;
        check_enum("time in force", self.time_in_force, TIF_POST_ONLY)?;
        check_enum("reduce only", self.reduce_only, 1)?;
        check_range("order expiry", self.order_expiry, 0, MAX_TIMESTAMP_MS)?;
        Ok(())
    }

    /// The ten payload elements, in wire order. Inlined per child for
    /// grouped orders, so any change here changes every grouped digest.
    pub(crate) fn push_payload(&self, builder: &mut ElementBuilder) {
        builder.push_u64(self.market_index as u16 as u64);
        builder.push_i64(self.client_order_index);
        builder.push_i64(self.base_amount);
        builder.push_u64(self.price as u64);
        builder.push_u64(self.is_ask as u64);
        builder.push_u64(self.order_type as u64);
        builder.push_u64(self.time_in_force as u64);
        builder.push_u64(self.reduce_only as u64);
        builder.push_u64(self.trigger_price as u64);
        builder.push_i64(self.order_expiry);
    }
}

impl TxInfo for CreateOrderTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_ORDER
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        self.validate_payload(false)
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        self.push_payload(&mut builder);
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
// CreateGroupedOrders
// =============================================================================

/// Payload accepted by the client's `create_grouped_orders`.
#[derive(Debug, Clone)]
pub struct CreateGroupedOrdersTxReq {
    pub grouping_type: u8,
    pub orders: Vec<CreateOrderTxReq>,
}

/// Signed CreateGroupedOrders record (tx type 28).
///
/// Children share the envelope header; only their payload fields enter
/// the hash, with no length prefix (the count is implied by the
/// grouping type and validation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateGroupedOrdersTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub grouping_type: u8,
    pub orders: Vec<CreateOrderTxInfo>,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl CreateGroupedOrdersTxInfo {
    fn is_otoco(&self) -> bool {
        self.grouping_type == GROUPING_ONE_TRIGGERS_A_ONE_CANCELS_THE_OTHER
    }
}

impl TxInfo for CreateGroupedOrdersTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CREATE_GROUPED_ORDERS
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        if self.grouping_type < GROUPING_ONE_TRIGGERS_THE_OTHER
            || self.grouping_type > GROUPING_ONE_TRIGGERS_A_ONE_CANCELS_THE_OTHER
        {
            return Err(LighterError::FieldOutOfRange {
                field: "grouping type",
                value: self.grouping_type as i64,
            });
        }
        if self.orders.len() < MIN_GROUPED_ORDERS || self.orders.len() > MAX_GROUPED_ORDERS {
            return Err(LighterError::PayloadLength {
                field: "grouped orders",
                expected: "1..=3 orders",
                actual: self.orders.len(),
            });
        }

        let otoco = self.is_otoco();
        for (position, order) in self.orders.iter().enumerate() {
            let child = position > 0;
            order.validate_payload(otoco && child)?;
            if otoco && child {
                if order.is_ask == self.orders[0].is_ask {
                    return Err(LighterError::FieldOutOfRange {
                        field: "grouped order side",
                        value: order.is_ask as i64,
                    });
                }
                if order.time_in_force != TIF_IMMEDIATE_OR_CANCEL {
                    return Err(LighterError::FieldOutOfRange {
                        field: "grouped order time in force",
                        value: order.time_in_force as i64,
                    });
                }
                if order.order_expiry == NIL_ORDER_EXPIRY {
                    return Err(LighterError::FieldOutOfRange {
                        field: "grouped order expiry",
                        value: order.order_expiry,
                    });
                }
                if order.base_amount != NIL_ORDER_BASE_AMOUNT {
                    return Err(LighterError::FieldOutOfRange {
                        field: "grouped order base amount",
                        value: order.base_amount,
                    });
                }
            }
        }
        Ok(())
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_u64(self.grouping_type as u64);
        for order in &self.orders {
            order.push_payload(&mut builder);
        }
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
// CancelOrder
// =============================================================================

#[derive(Debug, Clone)]
pub struct CancelOrderTxReq {
    pub market_index: i16,
    pub index: i64,
}

/// Signed CancelOrder record (tx type 15, 8 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancelOrderTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: i16,
    pub index: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for CancelOrderTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CANCEL_ORDER
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
        check_range("order index", self.index, 0, i64::MAX)
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_u64(self.market_index as u16 as u64);
        builder.push_i64(self.index);
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
// CancelAllOrders
// =============================================================================

#[derive(Debug, Clone)]
pub struct CancelAllOrdersTxReq {
    pub time_in_force: u8,
    /// Trigger timestamp for scheduled cancels; 0 for immediate/abort.
    pub time: i64,
}

/// Signed CancelAllOrders record (tx type 16, 8 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancelAllOrdersTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub time_in_force: u8,
    pub time: i64,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for CancelAllOrdersTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_CANCEL_ALL_ORDERS
    }

    fn validate(&self) -> Result<()> {
        validate_header(
            self.account_index,
            self.api_key_index,
            self.nonce,
            self.expired_at,
        )?;
        check_enum("cancel-all time in force", self.time_in_force, CANCEL_ALL_TIF_ABORT)?;
        if self.time_in_force == CANCEL_ALL_TIF_SCHEDULED {
            check_range("cancel-all time", self.time, 1, MAX_TIMESTAMP_MS)?;
        } else if self.time != 0 {
            return Err(LighterError::FieldOutOfRange {
                field: "cancel-all time",
                value: self.time,
            });
        }
        Ok(())
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_u64(self.time_in_force as u64);
        builder.push_i64(self.time);
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
// ModifyOrder
// =============================================================================

#[derive(Debug, Clone)]
pub struct ModifyOrderTxReq {
    pub market_index: i16,
    pub index: i64,
    pub base_amount: i64,
    pub price: u32,
    pub trigger_price: u32,
}

/// Signed ModifyOrder record (tx type 17, 11 field elements).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyOrderTxInfo {
    pub account_index: i64,
    pub api_key_index: u8,
    pub market_index: i16,
    pub index: i64,
    pub base_amount: i64,
    pub price: u32,
    pub trigger_price: u32,
    pub expired_at: i64,
    pub nonce: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_hash: Option<String>,
}

impl TxInfo for ModifyOrderTxInfo {
    fn tx_type(&self) -> u8 {
        TX_TYPE_MODIFY_ORDER
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
        check_range("order index", self.index, 0, i64::MAX)?;
        check_range("base amount", self.base_amount, MIN_BASE_AMOUNT, MAX_BASE_AMOUNT)?;
        if self.price < MIN_ORDER_PRICE {
            return Err(LighterError::FieldOutOfRange {
                field: "price",
                value: self.price as i64,
            });
        }
        Ok(())
    }

    fn canonical_elements(&self, chain_id: u32) -> Vec<Goldilocks> {
        let mut builder =
            ElementBuilder::with_prologue(chain_id, self.tx_type(), self.nonce, self.expired_at);
        builder.push_i64(self.account_index);
        builder.push_u64(self.api_key_index as u64);
        builder.push_u64(self.market_index as u16 as u64);
        builder.push_i64(self.index);
        builder.push_i64(self.base_amount);
        builder.push_u64(self.price as u64);
        builder.push_u64(self.trigger_price as u64);
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
