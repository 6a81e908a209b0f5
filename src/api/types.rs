//! Wire types for the exchange HTTP API
//!
//! Every response carries the common `{ code, message }` envelope;
//! `code == 200` means success, anything else is surfaced as an api
//! error with the server's message.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NextNonceResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub nonce: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    /// Registered public key, hex (the server may include a `0x` prefix)
    #[serde(default)]
    pub public_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendTxResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tx_hash: String,
}
