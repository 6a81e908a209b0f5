//! Signer error types
//!
//! All library errors are wrapped in the LighterError enum which
//! implements thiserror for consistent error handling. Callers match on
//! the variant to distinguish validation, transport and key failures.

use thiserror::Error;

/// Errors produced by the transaction construction and signing pipeline
#[derive(Error, Debug)]
pub enum LighterError {
    /// Malformed private key input (bad hex, wrong length, scalar out of field)
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// A numeric field failed its validation bounds or enum membership
    #[error("{field} out of range: {value}")]
    FieldOutOfRange { field: &'static str, value: i64 },

    /// A byte-string or list payload has the wrong length
    #[error("{field} length invalid: expected {expected}, got {actual}")]
    PayloadLength {
        field: &'static str,
        expected: &'static str,
        actual: usize,
    },

    /// A required option was absent when constructing outside a client
    #[error("missing required option: {0}")]
    MissingOpt(&'static str),

    /// The nonce source failed to produce a nonce
    #[error("nonce fetch failed: {0}")]
    NonceFetch(String),

    /// HTTP-level failure talking to the exchange
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The exchange has a different public key registered for this api key
    #[error("registered public key mismatch: registered {registered}, local {local}")]
    KeyMismatch { registered: String, local: String },

    /// Non-200 response envelope from the exchange
    #[error("api error {code}: {message}")]
    Api { code: i32, message: String },

    /// Registry lookup for an unknown (account, api key) pair
    #[error("no client registered for account {account_index}, api key {api_key_index}")]
    NotRegistered { account_index: i64, api_key_index: u8 },

    /// Failure inside the Schnorr/Poseidon2 primitives
    #[error("crypto error: {0}")]
    Crypto(#[from] goldilocks_crypto::CryptoError),

    /// Wire JSON (de)serialization failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex decoding failure
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Result type alias for signer operations
pub type Result<T> = std::result::Result<T, LighterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_out_of_range_display() {
        let err = LighterError::FieldOutOfRange {
            field: "account index",
            value: 0,
        };
        assert_eq!(err.to_string(), "account index out of range: 0");
    }

    #[test]
    fn test_payload_length_display() {
        let err = LighterError::PayloadLength {
            field: "memo",
            expected: "32 bytes",
            actual: 33,
        };
        assert_eq!(err.to_string(), "memo length invalid: expected 32 bytes, got 33");
    }

    #[test]
    fn test_api_error_display() {
        let err = LighterError::Api {
            code: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "api error 429: rate limited");
    }

    #[test]
    fn test_not_registered_display() {
        let err = LighterError::NotRegistered {
            account_index: 7,
            api_key_index: 2,
        };
        assert_eq!(
            err.to_string(),
            "no client registered for account 7, api key 2"
        );
    }
}
