//! End-to-end signing scenarios
//!
//! Fixed-vector flows across the record types, the auth token, the
//! optimistic nonce manager and the identity check, using a scripted
//! HTTP collaborator so no network is involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;

use lighter_sdk::constants::*;
use lighter_sdk::nonce::{NonceManager, OptimisticNonceManager};
use lighter_sdk::types::*;
use lighter_sdk::{sign_tx, KeyManager, LighterApi, LighterError, Result, TransactOpts, TxClient};

const SK_HEX: &str = "825ed9fde4a049e5eb4a0a31dd3cc53ac657e4e0171f44ae1224ad301f8e51af5c4bbcafa28e1b55";

struct ScriptedApi {
    bases: Vec<i64>,
    fetches: AtomicUsize,
    public_key: String,
}

impl ScriptedApi {
    fn new(bases: Vec<i64>, public_key: &str) -> Arc<Self> {
        Arc::new(Self {
            bases,
            fetches: AtomicUsize::new(0),
            public_key: public_key.to_string(),
        })
    }
}

#[async_trait]
impl LighterApi for ScriptedApi {
    async fn next_nonce(&self, _account_index: i64, _api_key_index: u8) -> Result<i64> {
        let call = self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.bases[call.min(self.bases.len() - 1)])
    }

    async fn api_key(&self, _account_index: i64, _api_key_index: u8) -> Result<String> {
        Ok(self.public_key.clone())
    }

    async fn send_tx(&self, _tx_type: u8, _tx_info: &str) -> Result<String> {
        Ok("txhash".to_string())
    }
}

fn key_manager() -> KeyManager {
    KeyManager::from_private_key_hex(SK_HEX).unwrap()
}

fn sample_create_order() -> CreateOrderTxInfo {
    CreateOrderTxInfo {
        account_index: 42,
        api_key_index: 0,
        market_index: 0,
        client_order_index: 1001,
        base_amount: 1_000_000,
        price: 350_000,
        is_ask: 1,
        order_type: ORDER_TYPE_LIMIT,
        time_in_force: TIF_GOOD_TILL_TIME,
        reduce_only: 0,
        trigger_price: 0,
        order_expiry: 1_100_000_000_000,
        expired_at: 1_000_000_000_000,
        nonce: 7,
        sig: None,
        signed_hash: None,
    }
}

#[test]
fn sign_create_order_fixed_vector() {
    let km = key_manager();
    let mut tx = sample_create_order();
    sign_tx(&mut tx, 1, &km).unwrap();

    assert_eq!(tx.tx_type(), 14);

    let signed_hash = tx.tx_hash().unwrap().to_string();
    assert_eq!(signed_hash.len(), DIGEST_LENGTH * 2);

    let sig = base64::engine::general_purpose::STANDARD
        .decode(tx.sig.as_deref().unwrap())
        .unwrap();
    assert_eq!(sig.len(), SIGNATURE_LENGTH);

    let digest: [u8; DIGEST_LENGTH] = hex::decode(&signed_hash).unwrap().try_into().unwrap();
    assert!(km.verify(&digest, &sig).unwrap());

    let wire: serde_json::Value = serde_json::from_str(&tx.tx_info().unwrap()).unwrap();
    for key in [
        "AccountIndex",
        "ApiKeyIndex",
        "ExpiredAt",
        "Nonce",
        "Sig",
        "SignedHash",
        "MarketIndex",
        "ClientOrderIndex",
        "BaseAmount",
        "Price",
        "IsAsk",
        "Type",
        "TimeInForce",
        "ReduceOnly",
        "TriggerPrice",
        "OrderExpiry",
    ] {
        assert!(wire.get(key).is_some(), "missing wire field {key}");
    }
}

#[test]
fn signed_hash_is_deterministic_signatures_are_not_required_to_be() {
    let km = key_manager();
    let mut first = sample_create_order();
    let mut second = sample_create_order();
    sign_tx(&mut first, 1, &km).unwrap();
    sign_tx(&mut second, 1, &km).unwrap();

    // same inputs hash identically; both signatures verify regardless
    assert_eq!(first.signed_hash, second.signed_hash);
    let digest: [u8; DIGEST_LENGTH] = hex::decode(first.tx_hash().unwrap())
        .unwrap()
        .try_into()
        .unwrap();
    for tx in [&first, &second] {
        let sig = base64::engine::general_purpose::STANDARD
            .decode(tx.sig.as_deref().unwrap())
            .unwrap();
        assert!(km.verify(&digest, &sig).unwrap());
    }
}

#[test]
fn sign_withdraw_fixed_vector() {
    let km = key_manager();
    let mut tx = WithdrawTxInfo {
        account_index: 42,
        api_key_index: 0,
        usdc_amount: 5_000_000,
        expired_at: 1_000_000_000_000,
        nonce: 8,
        sig: None,
        signed_hash: None,
    };
    sign_tx(&mut tx, 1, &km).unwrap();

    assert_eq!(tx.tx_type(), 13);
    let digest: [u8; DIGEST_LENGTH] = hex::decode(tx.tx_hash().unwrap())
        .unwrap()
        .try_into()
        .unwrap();
    let sig = base64::engine::general_purpose::STANDARD
        .decode(tx.sig.as_deref().unwrap())
        .unwrap();
    assert!(km.verify(&digest, &sig).unwrap());
}

#[tokio::test]
async fn transfer_with_memo_via_client() {
    let api = ScriptedApi::new(vec![9], "");
    let client = TxClient::new(api, SK_HEX, 1, 42, 0).unwrap();
    let req = TransferTxReq {
        to_account_index: 54_321,
        usdc_amount: 1_000_000,
        fee: 0,
        memo: vec![0x41; MEMO_LENGTH],
    };
    let opts = TransactOpts {
        nonce: Some(9),
        expired_at: Some(1_000_000_000_000),
        ..Default::default()
    };

    let first = client.transfer(&req, &opts).await.unwrap();
    let second = client.transfer(&req, &opts).await.unwrap();
    assert_eq!(first.signed_hash, second.signed_hash);
    assert!(first.message_to_sign.is_some());

    let wire: serde_json::Value = serde_json::from_str(&first.tx_info().unwrap()).unwrap();
    assert!(wire.get("Sig").is_some());
    assert!(wire.get("MessageToSign").is_some());
    assert_eq!(wire["Memo"].as_str().unwrap(), "41".repeat(32));
}

#[tokio::test]
async fn auth_token_round_trip() {
    let api = ScriptedApi::new(vec![0], "");
    let client = TxClient::new(api, SK_HEX, 1, 42, 0).unwrap();
    let token = client.auth_token(1_700_000_000).unwrap();

    let (message, sig_hex) = token.rsplit_once(':').unwrap();
    assert_eq!(message, "1700000000:42:0");
    assert_eq!(sig_hex.len(), SIGNATURE_LENGTH * 2);

    // the server recomputes the digest and verifies the signature
    let km = key_manager();
    let digest = lighter_sdk::hashing::digest_bytes(message.as_bytes());
    let signature = hex::decode(sig_hex).unwrap();
    assert!(km.verify(&digest, &signature).unwrap());
}

#[tokio::test]
async fn optimistic_nonce_consecutive_then_recovery() {
    let api = ScriptedApi::new(vec![100, 200], "");
    let manager = OptimisticNonceManager::new(api.clone());

    assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 100);
    assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 101);
    assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 102);
    assert_eq!(api.fetches.load(Ordering::SeqCst), 1);

    manager.acknowledge_failure(42, 0, 101).await;
    assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 200);
    assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn identity_check_mismatch() {
    let api = ScriptedApi::new(vec![0], &"bb".repeat(40));
    let client = TxClient::new(api, SK_HEX, 1, 42, 0).unwrap();
    let err = client.check().await.unwrap_err();
    assert!(matches!(err, LighterError::KeyMismatch { .. }));
}

#[test]
fn validation_gate_keeps_invalid_records_unsigned() {
    let km = key_manager();
    let mut tx = sample_create_order();
    tx.account_index = 0;
    assert!(sign_tx(&mut tx, 1, &km).is_err());
    assert!(tx.sig.is_none());
    assert!(tx.tx_hash().is_none());
}

#[test]
fn account_index_boundaries() {
    let km = key_manager();
    for (account_index, ok) in [
        (0, false),
        (1, true),
        (MAX_ACCOUNT_INDEX, true),
        (MAX_ACCOUNT_INDEX + 1, false),
    ] {
        let mut tx = sample_create_order();
        tx.account_index = account_index;
        assert_eq!(
            sign_tx(&mut tx, 1, &km).is_ok(),
            ok,
            "account index {account_index}"
        );
    }
}

#[test]
fn api_key_index_boundaries() {
    let km = key_manager();
    for (api_key_index, ok) in [(253u8, true), (254, false), (255, false)] {
        let mut tx = sample_create_order();
        tx.api_key_index = api_key_index;
        assert_eq!(
            sign_tx(&mut tx, 1, &km).is_ok(),
            ok,
            "api key index {api_key_index}"
        );
    }
}
