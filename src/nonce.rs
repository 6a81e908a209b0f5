//! Nonce issuance policies
//!
//! Two interchangeable managers behind one contract. The strict manager
//! asks the exchange for every nonce; the optimistic manager fetches
//! once per (account, api key) and hands out locally incremented values
//! until a failure is acknowledged, at which point it drops its window
//! and re-fetches the authoritative state.
//!
//! Neither manager retries; the caller owns the acknowledgement hooks.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

use crate::api::LighterApi;
use crate::errors::{LighterError, Result};

/// Per-(account, api key) nonce source.
///
/// `next_nonce` must return strictly monotonically increasing values
/// within a session; issuance order defines transaction order on the
/// exchange.
#[async_trait]
pub trait NonceManager: Send + Sync {
    async fn next_nonce(&self, account_index: i64, api_key_index: u8) -> Result<i64>;

    /// Mark a nonce as accepted by the exchange.
    async fn acknowledge_success(&self, account_index: i64, api_key_index: u8, nonce: i64);

    /// Mark a nonce as rejected or never submitted.
    async fn acknowledge_failure(&self, account_index: i64, api_key_index: u8, nonce: i64);

    /// Drop any local state for one key.
    async fn reset(&self, account_index: i64, api_key_index: u8);

    /// Drop all local state.
    async fn reset_all(&self);
}

async fn fetch_nonce(
    api: &Arc<dyn LighterApi>,
    account_index: i64,
    api_key_index: u8,
) -> Result<i64> {
    api.next_nonce(account_index, api_key_index)
        .await
        .map_err(|e| LighterError::NonceFetch(e.to_string()))
}

// =============================================================================
// Strict (API) Manager
// =============================================================================

/// Fetches the authoritative nonce for every call.
///
/// One round-trip per transaction, correct under any failure model.
/// The acknowledgement hooks are no-ops.
pub struct ApiNonceManager {
    api: Arc<dyn LighterApi>,
}

impl ApiNonceManager {
    pub fn new(api: Arc<dyn LighterApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl NonceManager for ApiNonceManager {
    async fn next_nonce(&self, account_index: i64, api_key_index: u8) -> Result<i64> {
        fetch_nonce(&self.api, account_index, api_key_index).await
    }

    async fn acknowledge_success(&self, _account_index: i64, _api_key_index: u8, _nonce: i64) {}

    async fn acknowledge_failure(&self, _account_index: i64, _api_key_index: u8, _nonce: i64) {}

    async fn reset(&self, _account_index: i64, _api_key_index: u8) {}

    async fn reset_all(&self) {}
}

// =============================================================================
// Optimistic Manager
// =============================================================================

#[derive(Default)]
struct NonceWindow {
    /// None until the first fetch, and again after a failure ack.
    next: Option<i64>,
    /// Issued but not yet acknowledged; observability only, correctness
    /// rests on `next`.
    pending: HashSet<i64>,
}

type SharedWindow = Arc<AsyncMutex<NonceWindow>>;

/// Fetches once per key, then issues locally incremented nonces.
///
/// The outer map is guarded by a short std mutex (never held across an
/// await); each key owns an async mutex so concurrent senders on the
/// same key serialize while different keys do not contend.
pub struct OptimisticNonceManager {
    api: Arc<dyn LighterApi>,
    windows: Mutex<HashMap<(i64, u8), SharedWindow>>,
}

impl OptimisticNonceManager {
    pub fn new(api: Arc<dyn LighterApi>) -> Self {
        Self {
            api,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn window(&self, account_index: i64, api_key_index: u8) -> SharedWindow {
        let mut windows = self.windows.lock().expect("nonce window map poisoned");
        windows
            .entry((account_index, api_key_index))
            .or_insert_with(|| Arc::new(AsyncMutex::new(NonceWindow::default())))
            .clone()
    }
}

#[async_trait]
impl NonceManager for OptimisticNonceManager {
    async fn next_nonce(&self, account_index: i64, api_key_index: u8) -> Result<i64> {
        let window = self.window(account_index, api_key_index);
        let mut state = window.lock().await;
        let nonce = match state.next {
            Some(nonce) => nonce,
            None => {
                let base = fetch_nonce(&self.api, account_index, api_key_index).await?;
                tracing::debug!(account_index, api_key_index, base, "nonce window fetched");
                base
            }
        };
        state.next = Some(nonce + 1);
        state.pending.insert(nonce);
        Ok(nonce)
    }

    async fn acknowledge_success(&self, account_index: i64, api_key_index: u8, nonce: i64) {
        let window = self.window(account_index, api_key_index);
        let mut state = window.lock().await;
        state.pending.remove(&nonce);
    }

    async fn acknowledge_failure(&self, account_index: i64, api_key_index: u8, nonce: i64) {
        let window = self.window(account_index, api_key_index);
        let mut state = window.lock().await;
        state.pending.remove(&nonce);
        if state.next.take().is_some() {
            tracing::warn!(
                account_index,
                api_key_index,
                nonce,
                "nonce rejected, dropping local window"
            );
        }
    }

    async fn reset(&self, account_index: i64, api_key_index: u8) {
        let mut windows = self.windows.lock().expect("nonce window map poisoned");
        windows.remove(&(account_index, api_key_index));
    }

    async fn reset_all(&self) {
        let mut windows = self.windows.lock().expect("nonce window map poisoned");
        windows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double that returns a scripted sequence of base nonces and
    /// counts the fetches.
    struct ScriptedApi {
        bases: Vec<i64>,
        fetches: AtomicUsize,
    }

    impl ScriptedApi {
        fn new(bases: Vec<i64>) -> Arc<Self> {
            Arc::new(Self {
                bases,
                fetches: AtomicUsize::new(0),
            })
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LighterApi for ScriptedApi {
        async fn next_nonce(&self, _account_index: i64, _api_key_index: u8) -> Result<i64> {
            let call = self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.bases[call.min(self.bases.len() - 1)])
        }

        async fn api_key(&self, _account_index: i64, _api_key_index: u8) -> Result<String> {
            unimplemented!("not used by nonce tests")
        }

        async fn send_tx(&self, _tx_type: u8, _tx_info: &str) -> Result<String> {
            unimplemented!("not used by nonce tests")
        }
    }

    #[tokio::test]
    async fn test_optimistic_consecutive_with_single_fetch() {
        let api = ScriptedApi::new(vec![100, 200]);
        let manager = OptimisticNonceManager::new(api.clone());

        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 100);
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 101);
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 102);
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_optimistic_failure_triggers_refetch() {
        let api = ScriptedApi::new(vec![100, 200]);
        let manager = OptimisticNonceManager::new(api.clone());

        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 100);
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 101);
        manager.acknowledge_failure(42, 0, 101).await;

        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 200);
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_optimistic_success_ack_keeps_window() {
        let api = ScriptedApi::new(vec![100]);
        let manager = OptimisticNonceManager::new(api.clone());

        let nonce = manager.next_nonce(42, 0).await.unwrap();
        manager.acknowledge_success(42, 0, nonce).await;
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 101);
        assert_eq!(api.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_optimistic_keys_are_independent() {
        let api = ScriptedApi::new(vec![100, 500]);
        let manager = OptimisticNonceManager::new(api.clone());

        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 100);
        assert_eq!(manager.next_nonce(42, 1).await.unwrap(), 500);
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 101);
        assert_eq!(manager.next_nonce(42, 1).await.unwrap(), 501);
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_optimistic_reset_refetches() {
        let api = ScriptedApi::new(vec![100, 300]);
        let manager = OptimisticNonceManager::new(api.clone());

        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 100);
        manager.reset(42, 0).await;
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_strict_fetches_every_time() {
        let api = ScriptedApi::new(vec![7, 8, 9]);
        let manager = ApiNonceManager::new(api.clone());

        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 7);
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 8);
        assert_eq!(manager.next_nonce(42, 0).await.unwrap(), 9);
        assert_eq!(api.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_issue_no_duplicates() {
        let api = ScriptedApi::new(vec![0]);
        let manager = Arc::new(OptimisticNonceManager::new(api));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager.next_nonce(1, 0).await.unwrap()
            }));
        }
        let mut seen = HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap()));
        }
        assert_eq!(seen.len(), 16);
    }
}
