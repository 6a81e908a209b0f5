//! Multi-client registry
//!
//! Maps (account index, api key index) to a client, with a "default"
//! pointer at the most recently registered one. Registration is rare
//! and reads dominate, so the map sits behind a readers-writer lock.
//! A process-wide instance is kept for binding layers that cannot
//! thread a registry value through stateless calls.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::constants::{DEFAULT_CLIENT_ACCOUNT_INDEX, DEFAULT_CLIENT_API_KEY_INDEX};
use crate::errors::{LighterError, Result};

use super::TxClient;

#[derive(Default)]
struct Inner {
    clients: HashMap<(i64, u8), Arc<TxClient>>,
    default: Option<Arc<TxClient>>,
}

pub struct ClientRegistry {
    inner: RwLock<Inner>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a client under its (account, api key) pair.
    ///
    /// Idempotent overwrite; the default pointer moves to the newest
    /// registration.
    pub fn register(&self, client: Arc<TxClient>) {
        let key = (client.account_index(), client.api_key_index());
        let mut inner = self.inner.write().expect("client registry lock poisoned");
        inner.clients.insert(key, Arc::clone(&client));
        inner.default = Some(client);
        tracing::debug!(
            account_index = key.0,
            api_key_index = key.1,
            "client registered"
        );
    }

    /// Look up the client for a pair. The sentinel pair `(-1, 255)`
    /// returns the default client.
    pub fn lookup(&self, account_index: i64, api_key_index: u8) -> Result<Arc<TxClient>> {
        let inner = self.inner.read().expect("client registry lock poisoned");
        if account_index == DEFAULT_CLIENT_ACCOUNT_INDEX
            && api_key_index == DEFAULT_CLIENT_API_KEY_INDEX
        {
            return inner.default.clone().ok_or(LighterError::NotRegistered {
                account_index,
                api_key_index,
            });
        }
        inner
            .clients
            .get(&(account_index, api_key_index))
            .cloned()
            .ok_or(LighterError::NotRegistered {
                account_index,
                api_key_index,
            })
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("client registry lock poisoned")
            .clients
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared process-wide registry.
pub fn registry() -> &'static ClientRegistry {
    static REGISTRY: OnceLock<ClientRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ClientRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LighterApi;
    use async_trait::async_trait;

    const SK_HEX: &str = "825ed9fde4a049e5eb4a0a31dd3cc53ac657e4e0171f44ae1224ad301f8e51af5c4bbcafa28e1b55";

    struct NoopApi;

    #[async_trait]
    impl LighterApi for NoopApi {
        async fn next_nonce(&self, _account_index: i64, _api_key_index: u8) -> Result<i64> {
            Ok(0)
        }

        async fn api_key(&self, _account_index: i64, _api_key_index: u8) -> Result<String> {
            Ok(String::new())
        }

        async fn send_tx(&self, _tx_type: u8, _tx_info: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn client(account_index: i64, api_key_index: u8) -> Arc<TxClient> {
        Arc::new(
            TxClient::new(Arc::new(NoopApi), SK_HEX, 300, account_index, api_key_index).unwrap(),
        )
    }

    #[test]
    fn test_register_then_lookup_returns_same_instance() {
        let registry = ClientRegistry::new();
        let client = client(42, 0);
        registry.register(Arc::clone(&client));

        let found = registry.lookup(42, 0).unwrap();
        assert!(Arc::ptr_eq(&client, &found));
    }

    #[test]
    fn test_lookup_unknown_pair() {
        let registry = ClientRegistry::new();
        let err = registry.lookup(1, 1).unwrap_err();
        assert!(matches!(err, LighterError::NotRegistered { .. }));
    }

    #[test]
    fn test_default_sentinel_tracks_latest_registration() {
        let registry = ClientRegistry::new();
        assert!(registry
            .lookup(DEFAULT_CLIENT_ACCOUNT_INDEX, DEFAULT_CLIENT_API_KEY_INDEX)
            .is_err());

        let first = client(42, 0);
        let second = client(43, 1);
        registry.register(Arc::clone(&first));
        registry.register(Arc::clone(&second));

        let default = registry
            .lookup(DEFAULT_CLIENT_ACCOUNT_INDEX, DEFAULT_CLIENT_API_KEY_INDEX)
            .unwrap();
        assert!(Arc::ptr_eq(&second, &default));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_overwrites_same_pair() {
        let registry = ClientRegistry::new();
        let first = client(42, 0);
        let second = client(42, 0);
        registry.register(first);
        registry.register(Arc::clone(&second));

        assert_eq!(registry.len(), 1);
        let found = registry.lookup(42, 0).unwrap();
        assert!(Arc::ptr_eq(&second, &found));
    }
}
