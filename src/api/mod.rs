//! Exchange HTTP collaborator
//!
//! The signer core consumes three endpoints: next-nonce, api-key lookup
//! and transaction submission. The LighterApi trait keeps the client
//! and nonce managers testable; HttpApi is the thin reqwest-backed
//! implementation. The core never retries: transport and api errors
//! are surfaced to the caller as-is.

pub mod types;

use async_trait::async_trait;

use crate::constants::{
    MAINNET_BASE_URL, MAINNET_CHAIN_ID, TESTNET_BASE_URL, TESTNET_CHAIN_ID,
};
use crate::errors::{LighterError, Result};

use types::{ApiKeyResponse, NextNonceResponse, SendTxResponse};

/// Minimum exchange surface consumed by the signer core.
#[async_trait]
pub trait LighterApi: Send + Sync {
    /// Smallest not-yet-used nonce for (account, api key).
    async fn next_nonce(&self, account_index: i64, api_key_index: u8) -> Result<i64>;

    /// Registered public key hex for (account, api key).
    async fn api_key(&self, account_index: i64, api_key_index: u8) -> Result<String>;

    /// Submit a signed record; returns the exchange's tx hash.
    async fn send_tx(&self, tx_type: u8, tx_info: &str) -> Result<String>;
}

/// Network selection: REST base URL plus the chain id that is mixed
/// into every transaction hash.
#[derive(Debug, Clone)]
pub struct LighterConfig {
    pub base_url: String,
    pub chain_id: u32,
}

impl LighterConfig {
    pub fn mainnet() -> Self {
        Self {
            base_url: MAINNET_BASE_URL.to_string(),
            chain_id: MAINNET_CHAIN_ID,
        }
    }

    pub fn testnet() -> Self {
        Self {
            base_url: TESTNET_BASE_URL.to_string(),
            chain_id: TESTNET_CHAIN_ID,
        }
    }
}

/// reqwest-backed LighterApi implementation.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(MAINNET_BASE_URL)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET_BASE_URL)
    }

    fn ensure_ok(code: i32, message: Option<String>) -> Result<()> {
        if code != 200 {
            return Err(LighterError::Api {
                code,
                message: message.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LighterApi for HttpApi {
    async fn next_nonce(&self, account_index: i64, api_key_index: u8) -> Result<i64> {
        let url = format!(
            "{}/api/v1/nextNonce?account_index={}&api_key_index={}",
            self.base_url, account_index, api_key_index
        );
        let resp: NextNonceResponse = self.http.get(&url).send().await?.json().await?;
        Self::ensure_ok(resp.code, resp.message)?;
        Ok(resp.nonce)
    }

    async fn api_key(&self, account_index: i64, api_key_index: u8) -> Result<String> {
        let url = format!(
            "{}/api/v1/apikeys?account_index={}&api_key_index={}",
            self.base_url, account_index, api_key_index
        );
        let resp: ApiKeyResponse = self.http.get(&url).send().await?.json().await?;
        Self::ensure_ok(resp.code, resp.message)?;
        Ok(resp.public_key)
    }

    async fn send_tx(&self, tx_type: u8, tx_info: &str) -> Result<String> {
        let url = format!("{}/api/v1/sendTx", self.base_url);
        let form = [
            ("tx_type", tx_type.to_string()),
            ("tx_info", tx_info.to_string()),
        ];
        let resp: SendTxResponse = self.http.post(&url).form(&form).send().await?.json().await?;
        Self::ensure_ok(resp.code, resp.message)?;
        tracing::debug!(tx_type, tx_hash = %resp.tx_hash, "transaction submitted");
        Ok(resp.tx_hash)
    }
}
