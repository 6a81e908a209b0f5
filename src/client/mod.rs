//! Transaction client
//!
//! A TxClient owns one key pair and composes the record types, a nonce
//! source and the HTTP collaborator behind one method per exchange
//! operation: fill defaults, validate, hash, sign, return the record.
//! The client signs; submission stays with the caller (or the
//! LighterApi collaborator's send_tx).

pub mod registry;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::LighterApi;
use crate::constants::*;
use crate::errors::{LighterError, Result};
use crate::nonce::{NonceManager, OptimisticNonceManager};
use crate::signer::KeyManager;
use crate::types::*;

/// Current wall clock in epoch milliseconds.
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub struct TxClient {
    api: Arc<dyn LighterApi>,
    key_manager: KeyManager,
    chain_id: u32,
    account_index: i64,
    api_key_index: u8,
    nonces: Arc<dyn NonceManager>,
}

impl std::fmt::Debug for TxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxClient")
            .field("key_manager", &self.key_manager)
            .field("chain_id", &self.chain_id)
            .field("account_index", &self.account_index)
            .field("api_key_index", &self.api_key_index)
            .finish_non_exhaustive()
    }
}

impl TxClient {
    /// Create a client bound to one (account, api key) pair.
    ///
    /// Uses the optimistic nonce policy by default; swap it with
    /// [`TxClient::with_nonce_manager`].
    pub fn new(
        api: Arc<dyn LighterApi>,
        private_key_hex: &str,
        chain_id: u32,
        account_index: i64,
        api_key_index: u8,
    ) -> Result<Self> {
        let key_manager = KeyManager::from_private_key_hex(private_key_hex)?;
        if account_index < MIN_ACCOUNT_INDEX || account_index > MAX_ACCOUNT_INDEX {
            return Err(LighterError::FieldOutOfRange {
                field: "account index",
                value: account_index,
            });
        }
        if api_key_index > MAX_API_KEY_INDEX {
            return Err(LighterError::FieldOutOfRange {
                field: "api key index",
                value: api_key_index as i64,
            });
        }
        let nonces: Arc<dyn NonceManager> =
            Arc::new(OptimisticNonceManager::new(Arc::clone(&api)));
        tracing::debug!(account_index, api_key_index, chain_id, "tx client created");
        Ok(Self {
            api,
            key_manager,
            chain_id,
            account_index,
            api_key_index,
            nonces,
        })
    }

    /// Replace the nonce policy.
    pub fn with_nonce_manager(mut self, nonces: Arc<dyn NonceManager>) -> Self {
        self.nonces = nonces;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn account_index(&self) -> i64 {
        self.account_index
    }

    pub fn api_key_index(&self) -> u8 {
        self.api_key_index
    }

    pub fn chain_id(&self) -> u32 {
        self.chain_id
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.key_manager.public_key_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        self.key_manager.public_key_hex()
    }

    /// The nonce source, for acknowledgement after submission.
    pub fn nonce_manager(&self) -> Arc<dyn NonceManager> {
        Arc::clone(&self.nonces)
    }

    // =========================================================================
    // Default Filling
    // =========================================================================

    /// Fill missing header values in the documented order: client
    /// account, client api key, `now + 10 min` expiry, then a nonce from
    /// the nonce source. A nonce of `-1` counts as missing.
    async fn resolve_opts(&self, opts: &TransactOpts) -> Result<ResolvedOpts> {
        let account_index = opts.from_account_index.unwrap_or(self.account_index);
        let api_key_index = opts.api_key_index.unwrap_or(self.api_key_index);
        let expired_at = opts
            .expired_at
            .unwrap_or_else(|| now_ms() + DEFAULT_TX_EXPIRY_MS);
        let nonce = match opts.nonce {
            Some(nonce) if nonce >= MIN_NONCE => nonce,
            _ => self.nonces.next_nonce(account_index, api_key_index).await?,
        };
        Ok(ResolvedOpts {
            account_index,
            api_key_index,
            expired_at,
            nonce,
        })
    }

    /// Variant filler for order expiries: `-1` becomes `now + 28 days`,
    /// `0` stays "no expiry", and an explicit expiry must be at least
    /// 5 minutes out.
    fn fill_order_expiry(order_expiry: i64, now: i64) -> Result<i64> {
        match order_expiry {
            DEFAULT_ORDER_EXPIRY => Ok(now + DEFAULT_ORDER_EXPIRY_MS),
            NIL_ORDER_EXPIRY => Ok(NIL_ORDER_EXPIRY),
            explicit if explicit < now + MIN_ORDER_EXPIRY_MS => {
                Err(LighterError::FieldOutOfRange {
                    field: "order expiry",
                    value: explicit,
                })
            }
            explicit => Ok(explicit),
        }
    }

    fn sign<T: TxInfo>(&self, tx: &mut T) -> Result<()> {
        sign_tx(tx, self.chain_id, &self.key_manager)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    pub async fn create_order(
        &self,
        req: &CreateOrderTxReq,
        opts: &TransactOpts,
    ) -> Result<CreateOrderTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut filled = req.clone();
        filled.order_expiry = Self::fill_order_expiry(req.order_expiry, now_ms())?;
        let mut tx = CreateOrderTxInfo::from_req(&filled, resolved);
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn create_grouped_orders(
        &self,
        req: &CreateGroupedOrdersTxReq,
        opts: &TransactOpts,
    ) -> Result<CreateGroupedOrdersTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let now = now_ms();
        let mut orders = Vec::with_capacity(req.orders.len());
        for child in &req.orders {
            let mut filled = child.clone();
            filled.order_expiry = Self::fill_order_expiry(child.order_expiry, now)?;
            orders.push(CreateOrderTxInfo::from_req(&filled, resolved));
        }
        let mut tx = CreateGroupedOrdersTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            grouping_type: req.grouping_type,
            orders,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn cancel_order(
        &self,
        req: &CancelOrderTxReq,
        opts: &TransactOpts,
    ) -> Result<CancelOrderTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = CancelOrderTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            market_index: req.market_index,
            index: req.index,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn cancel_all_orders(
        &self,
        req: &CancelAllOrdersTxReq,
        opts: &TransactOpts,
    ) -> Result<CancelAllOrdersTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = CancelAllOrdersTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            time_in_force: req.time_in_force,
            time: req.time,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn modify_order(
        &self,
        req: &ModifyOrderTxReq,
        opts: &TransactOpts,
    ) -> Result<ModifyOrderTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = ModifyOrderTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            market_index: req.market_index,
            index: req.index,
            base_amount: req.base_amount,
            price: req.price,
            trigger_price: req.trigger_price,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    // =========================================================================
    // Order Conveniences
    // =========================================================================

    /// IOC order priced at the book-crossing sentinel for its side.
    pub async fn create_market_order(
        &self,
        market_index: i16,
        client_order_index: i64,
        base_amount: i64,
        is_ask: bool,
        opts: &TransactOpts,
    ) -> Result<CreateOrderTxInfo> {
        let req = CreateOrderTxReq {
            market_index,
            client_order_index,
            base_amount,
            price: if is_ask { MIN_ORDER_PRICE } else { MAX_ORDER_PRICE },
            is_ask: is_ask as u8,
            order_type: ORDER_TYPE_MARKET,
            time_in_force: TIF_IMMEDIATE_OR_CANCEL,
            reduce_only: 0,
            trigger_price: 0,
            order_expiry: NIL_ORDER_EXPIRY,
        };
        self.create_order(&req, opts).await
    }

    /// Good-till-time limit order with the default 28-day expiry.
    pub async fn create_limit_order(
        &self,
        market_index: i16,
        client_order_index: i64,
        base_amount: i64,
        price: u32,
        is_ask: bool,
        opts: &TransactOpts,
    ) -> Result<CreateOrderTxInfo> {
        let req = CreateOrderTxReq {
            market_index,
            client_order_index,
            base_amount,
            price,
            is_ask: is_ask as u8,
            order_type: ORDER_TYPE_LIMIT,
            time_in_force: TIF_GOOD_TILL_TIME,
            reduce_only: 0,
            trigger_price: 0,
            order_expiry: DEFAULT_ORDER_EXPIRY,
        };
        self.create_order(&req, opts).await
    }

    /// Reduce-only take-profit trigger order.
    pub async fn create_take_profit_order(
        &self,
        market_index: i16,
        client_order_index: i64,
        base_amount: i64,
        trigger_price: u32,
        price: u32,
        is_ask: bool,
        opts: &TransactOpts,
    ) -> Result<CreateOrderTxInfo> {
        let req = CreateOrderTxReq {
            market_index,
            client_order_index,
            base_amount,
            price,
            is_ask: is_ask as u8,
            order_type: ORDER_TYPE_TAKE_PROFIT,
            time_in_force: TIF_IMMEDIATE_OR_CANCEL,
            reduce_only: 1,
            trigger_price,
            order_expiry: DEFAULT_ORDER_EXPIRY,
        };
        self.create_order(&req, opts).await
    }

    /// Reduce-only stop-loss trigger order.
    pub async fn create_stop_loss_order(
        &self,
        market_index: i16,
        client_order_index: i64,
        base_amount: i64,
        trigger_price: u32,
        price: u32,
        is_ask: bool,
        opts: &TransactOpts,
    ) -> Result<CreateOrderTxInfo> {
        let req = CreateOrderTxReq {
            market_index,
            client_order_index,
            base_amount,
            price,
            is_ask: is_ask as u8,
            order_type: ORDER_TYPE_STOP_LOSS,
            time_in_force: TIF_IMMEDIATE_OR_CANCEL,
            reduce_only: 1,
            trigger_price,
            order_expiry: DEFAULT_ORDER_EXPIRY,
        };
        self.create_order(&req, opts).await
    }

    // =========================================================================
    // Transfers & Account
    // =========================================================================

    pub async fn transfer(
        &self,
        req: &TransferTxReq,
        opts: &TransactOpts,
    ) -> Result<TransferTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = TransferTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            to_account_index: req.to_account_index,
            usdc_amount: req.usdc_amount,
            fee: req.fee,
            memo: req.memo.clone(),
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
            message_to_sign: None,
        };
        tx.message_to_sign = Some(tx.build_message_to_sign());
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn withdraw(
        &self,
        req: &WithdrawTxReq,
        opts: &TransactOpts,
    ) -> Result<WithdrawTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = WithdrawTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            usdc_amount: req.usdc_amount,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn change_pub_key(
        &self,
        req: &ChangePubKeyTxReq,
        opts: &TransactOpts,
    ) -> Result<ChangePubKeyTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = ChangePubKeyTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            pub_key: req.pub_key.clone(),
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
            message_to_sign: None,
        };
        tx.message_to_sign = Some(tx.build_message_to_sign());
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn create_sub_account(&self, opts: &TransactOpts) -> Result<CreateSubAccountTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = CreateSubAccountTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn update_leverage(
        &self,
        req: &UpdateLeverageTxReq,
        opts: &TransactOpts,
    ) -> Result<UpdateLeverageTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = UpdateLeverageTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            market_index: req.market_index,
            initial_margin_fraction: req.initial_margin_fraction,
            margin_mode: req.margin_mode,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn update_margin(
        &self,
        req: &UpdateMarginTxReq,
        opts: &TransactOpts,
    ) -> Result<UpdateMarginTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = UpdateMarginTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            market_index: req.market_index,
            usdc_amount: req.usdc_amount,
            direction: req.direction,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    // =========================================================================
    // Pools & Staking
    // =========================================================================

    pub async fn create_public_pool(
        &self,
        req: &CreatePublicPoolTxReq,
        opts: &TransactOpts,
    ) -> Result<CreatePublicPoolTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = CreatePublicPoolTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            operator_fee: req.operator_fee,
            initial_total_shares: req.initial_total_shares,
            min_operator_share_rate: req.min_operator_share_rate,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn update_public_pool(
        &self,
        req: &UpdatePublicPoolTxReq,
        opts: &TransactOpts,
    ) -> Result<UpdatePublicPoolTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = UpdatePublicPoolTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            public_pool_index: req.public_pool_index,
            status: req.status,
            operator_fee: req.operator_fee,
            min_operator_share_rate: req.min_operator_share_rate,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn mint_shares(
        &self,
        req: &MintSharesTxReq,
        opts: &TransactOpts,
    ) -> Result<MintSharesTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = MintSharesTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            public_pool_index: req.public_pool_index,
            share_amount: req.share_amount,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn burn_shares(
        &self,
        req: &BurnSharesTxReq,
        opts: &TransactOpts,
    ) -> Result<BurnSharesTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = BurnSharesTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            public_pool_index: req.public_pool_index,
            share_amount: req.share_amount,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn stake_assets(
        &self,
        req: &StakeAssetsTxReq,
        opts: &TransactOpts,
    ) -> Result<StakeAssetsTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = StakeAssetsTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            staking_pool_index: req.staking_pool_index,
            share_amount: req.share_amount,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    pub async fn unstake_assets(
        &self,
        req: &UnstakeAssetsTxReq,
        opts: &TransactOpts,
    ) -> Result<UnstakeAssetsTxInfo> {
        let resolved = self.resolve_opts(opts).await?;
        let mut tx = UnstakeAssetsTxInfo {
            account_index: resolved.account_index,
            api_key_index: resolved.api_key_index,
            staking_pool_index: req.staking_pool_index,
            share_amount: req.share_amount,
            expired_at: resolved.expired_at,
            nonce: resolved.nonce,
            sig: None,
            signed_hash: None,
        };
        self.sign(&mut tx)?;
        Ok(tx)
    }

    // =========================================================================
    // Identity & Auth
    // =========================================================================

    /// Compare the locally derived public key against the key the
    /// exchange has registered for this (account, api key).
    pub async fn check(&self) -> Result<()> {
        let registered = self
            .api
            .api_key(self.account_index, self.api_key_index)
            .await?;
        let registered = registered.to_ascii_lowercase();
        let registered = registered.trim_start_matches("0x").to_string();
        let local = self.key_manager.public_key_hex();
        if registered != local {
            return Err(LighterError::KeyMismatch { registered, local });
        }
        tracing::debug!(
            account_index = self.account_index,
            api_key_index = self.api_key_index,
            "registered api key verified"
        );
        Ok(())
    }

    /// Short-lived `message:signature` token for read endpoints.
    /// The deadline is unix seconds.
    pub fn auth_token(&self, deadline: i64) -> Result<String> {
        self.key_manager
            .auth_token(deadline, self.account_index, self.api_key_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const SK_HEX: &str = "825ed9fde4a049e5eb4a0a31dd3cc53ac657e4e0171f44ae1224ad301f8e51af5c4bbcafa28e1b55";

    struct StubApi {
        nonce: i64,
        public_key: String,
    }

    #[async_trait]
    impl LighterApi for StubApi {
        async fn next_nonce(&self, _account_index: i64, _api_key_index: u8) -> Result<i64> {
            Ok(self.nonce)
        }

        async fn api_key(&self, _account_index: i64, _api_key_index: u8) -> Result<String> {
            Ok(self.public_key.clone())
        }

        async fn send_tx(&self, _tx_type: u8, _tx_info: &str) -> Result<String> {
            Ok("stub".to_string())
        }
    }

    fn client_with(api: StubApi) -> TxClient {
        TxClient::new(Arc::new(api), SK_HEX, TESTNET_CHAIN_ID, 42, 0).unwrap()
    }

    fn client() -> TxClient {
        client_with(StubApi {
            nonce: 100,
            public_key: "aa".repeat(40),
        })
    }

    #[test]
    fn test_new_rejects_out_of_range_identity() {
        let api = Arc::new(StubApi {
            nonce: 0,
            public_key: String::new(),
        });
        assert!(TxClient::new(Arc::clone(&api) as Arc<dyn LighterApi>, SK_HEX, 300, 0, 0).is_err());
        assert!(TxClient::new(api, SK_HEX, 300, 42, 254).is_err());
    }

    #[tokio::test]
    async fn test_create_order_fills_nonce_from_source() {
        let tx = client()
            .create_limit_order(0, 1, 1_000, 2_500, false, &TransactOpts::default())
            .await
            .unwrap();
        assert_eq!(tx.nonce, 100);
        assert_eq!(tx.account_index, 42);
        assert!(tx.sig.is_some());
        assert!(tx.signed_hash.is_some());
    }

    #[tokio::test]
    async fn test_explicit_nonce_skips_source() {
        let opts = TransactOpts {
            nonce: Some(7),
            expired_at: Some(1_000_000_000_000),
            ..Default::default()
        };
        let tx = client()
            .withdraw(&WithdrawTxReq { usdc_amount: 5_000_000 }, &opts)
            .await
            .unwrap();
        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.expired_at, 1_000_000_000_000);
    }

    #[tokio::test]
    async fn test_market_order_price_sentinels() {
        let buy = client()
            .create_market_order(0, 1, 1_000, false, &TransactOpts::default())
            .await
            .unwrap();
        assert_eq!(buy.price, MAX_ORDER_PRICE);
        assert_eq!(buy.order_type, ORDER_TYPE_MARKET);
        assert_eq!(buy.time_in_force, TIF_IMMEDIATE_OR_CANCEL);
        assert_eq!(buy.order_expiry, NIL_ORDER_EXPIRY);

        let sell = client()
            .create_market_order(0, 2, 1_000, true, &TransactOpts::default())
            .await
            .unwrap();
        assert_eq!(sell.price, MIN_ORDER_PRICE);
        assert_eq!(sell.is_ask, 1);
    }

    #[tokio::test]
    async fn test_tp_sl_are_reduce_only_triggers() {
        let tp = client()
            .create_take_profit_order(0, 3, 1_000, 3_000, 2_900, true, &TransactOpts::default())
            .await
            .unwrap();
        assert_eq!(tp.order_type, ORDER_TYPE_TAKE_PROFIT);
        assert_eq!(tp.reduce_only, 1);
        assert!(tp.order_expiry > 0);

        let sl = client()
            .create_stop_loss_order(0, 4, 1_000, 2_000, 1_900, true, &TransactOpts::default())
            .await
            .unwrap();
        assert_eq!(sl.order_type, ORDER_TYPE_STOP_LOSS);
        assert_eq!(sl.reduce_only, 1);
    }

    #[tokio::test]
    async fn test_stale_explicit_order_expiry_rejected() {
        let req = CreateOrderTxReq {
            market_index: 0,
            client_order_index: 1,
            base_amount: 1_000,
            price: 2_500,
            is_ask: 0,
            order_type: ORDER_TYPE_LIMIT,
            time_in_force: TIF_GOOD_TILL_TIME,
            reduce_only: 0,
            trigger_price: 0,
            order_expiry: 1_000, // far in the past
        };
        let err = client()
            .create_order(&req, &TransactOpts::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LighterError::FieldOutOfRange { field: "order expiry", .. }
        ));
    }

    #[tokio::test]
    async fn test_validation_failure_never_signs() {
        let req = TransferTxReq {
            to_account_index: 54_321,
            usdc_amount: 1_000,
            fee: 0,
            memo: vec![0; 31],
        };
        let err = client()
            .transfer(&req, &TransactOpts::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LighterError::PayloadLength { .. }));
    }

    #[tokio::test]
    async fn test_transfer_carries_message_to_sign() {
        let req = TransferTxReq {
            to_account_index: 54_321,
            usdc_amount: 1_000,
            fee: 10,
            memo: vec![0x41; MEMO_LENGTH],
        };
        let opts = TransactOpts {
            nonce: Some(9),
            ..Default::default()
        };
        let tx = client().transfer(&req, &opts).await.unwrap();
        let message = tx.message_to_sign.as_deref().unwrap();
        assert!(message.contains("54321"));
        assert!(message.contains("Nonce: 9"));
    }

    #[tokio::test]
    async fn test_check_matches_registered_key() {
        let km = KeyManager::from_private_key_hex(SK_HEX).unwrap();
        let good = client_with(StubApi {
            nonce: 0,
            public_key: format!("0x{}", km.public_key_hex().to_ascii_uppercase()),
        });
        assert!(good.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_check_mismatch() {
        let bad = client_with(StubApi {
            nonce: 0,
            public_key: "bb".repeat(40),
        });
        let err = bad.check().await.unwrap_err();
        assert!(matches!(err, LighterError::KeyMismatch { .. }));
    }

    #[tokio::test]
    async fn test_auth_token_binds_client_identity() {
        let token = client().auth_token(1_700_000_000).unwrap();
        assert!(token.starts_with("1700000000:42:0:"));
    }
}
