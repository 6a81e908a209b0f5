//! Lighter SDK — client-side transaction signer
//!
//! Converts typed requests (orders, transfers, pool and margin
//! operations) into signed, wire-formatted transactions for the Lighter
//! zk-rollup exchange:
//! - Canonical Goldilocks field-element packing and Poseidon2 hashing
//! - Schnorr signatures over ecGFp5 via a per-client key manager
//! - Optimistic and strict nonce policies per (account, api key)
//! - A per-operation transaction client plus a multi-client registry
//!
//! The signer produces bytes; it never broadcasts. Submission goes
//! through the caller or the thin HTTP collaborator in [`api`].

pub mod api;
pub mod client;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod nonce;
pub mod signer;
pub mod types;

pub use api::{HttpApi, LighterApi, LighterConfig};
pub use client::registry::{registry, ClientRegistry};
pub use client::TxClient;
pub use errors::{LighterError, Result};
pub use nonce::{ApiNonceManager, NonceManager, OptimisticNonceManager};
pub use signer::KeyManager;
pub use types::{sign_tx, TransactOpts, TxInfo};
