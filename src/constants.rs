//! Exchange protocol constants
//!
//! Transaction-type bytes, validation bounds, enum values and
//! construction defaults. The tx-type bytes and the canonical packing
//! widths are exchange-consensus-critical and must not be changed.

// =============================================================================
// Transaction Types
// =============================================================================

/// L1-signed ChangePubKey wrapped as an L2 transaction
pub const TX_TYPE_L1_CHANGE_PUB_KEY: u8 = 2;
/// L2 ChangePubKey
pub const TX_TYPE_CHANGE_PUB_KEY: u8 = 8;
pub const TX_TYPE_CREATE_SUB_ACCOUNT: u8 = 9;
pub const TX_TYPE_CREATE_PUBLIC_POOL: u8 = 10;
pub const TX_TYPE_UPDATE_PUBLIC_POOL: u8 = 11;
pub const TX_TYPE_TRANSFER: u8 = 12;
pub const TX_TYPE_WITHDRAW: u8 = 13;
pub const TX_TYPE_CREATE_ORDER: u8 = 14;
pub const TX_TYPE_CANCEL_ORDER: u8 = 15;
pub const TX_TYPE_CANCEL_ALL_ORDERS: u8 = 16;
pub const TX_TYPE_MODIFY_ORDER: u8 = 17;
pub const TX_TYPE_MINT_SHARES: u8 = 18;
pub const TX_TYPE_BURN_SHARES: u8 = 19;
pub const TX_TYPE_UPDATE_LEVERAGE: u8 = 20;
pub const TX_TYPE_CREATE_GROUPED_ORDERS: u8 = 28;
pub const TX_TYPE_UPDATE_MARGIN: u8 = 29;
pub const TX_TYPE_STAKE_ASSETS: u8 = 30;
pub const TX_TYPE_UNSTAKE_ASSETS: u8 = 31;

// =============================================================================
// Networks
// =============================================================================

/// Mainnet REST API base URL
pub const MAINNET_BASE_URL: &str = "https://mainnet.zklighter.elliot.ai";
/// Testnet REST API base URL
pub const TESTNET_BASE_URL: &str = "https://testnet.zklighter.elliot.ai";

/// Chain id mixed into every transaction hash (mainnet)
pub const MAINNET_CHAIN_ID: u32 = 304;
/// Chain id mixed into every transaction hash (testnet)
pub const TESTNET_CHAIN_ID: u32 = 300;

// =============================================================================
// Accounts, API Keys, Nonces
// =============================================================================

pub const MIN_ACCOUNT_INDEX: i64 = 1;
pub const MAX_ACCOUNT_INDEX: i64 = (1 << 47) - 1;

pub const MIN_API_KEY_INDEX: u8 = 0;
/// 254 and 255 are reserved by the exchange
pub const MAX_API_KEY_INDEX: u8 = 253;

/// Registry sentinel: account index denoting "the default client"
pub const DEFAULT_CLIENT_ACCOUNT_INDEX: i64 = -1;
/// Registry sentinel: api key index denoting "the default client"
pub const DEFAULT_CLIENT_API_KEY_INDEX: u8 = 255;

pub const MIN_NONCE: i64 = 0;
/// Marker for "no nonce supplied, ask the nonce source"
pub const NIL_NONCE: i64 = -1;

// =============================================================================
// Timestamps & Expiries
// =============================================================================

/// Largest representable millisecond timestamp (40-bit)
pub const MAX_TIMESTAMP_MS: i64 = (1 << 40) - 1;

/// Default transaction expiry window: 10 minutes
pub const DEFAULT_TX_EXPIRY_MS: i64 = 10 * 60 * 1000;
/// Default order expiry window applied for the `-1` marker: 28 days
pub const DEFAULT_ORDER_EXPIRY_MS: i64 = 28 * 24 * 60 * 60 * 1000;
/// Minimum distance into the future for an explicit order expiry
pub const MIN_ORDER_EXPIRY_MS: i64 = 5 * 60 * 1000;

/// Order expiry value meaning "no expiry" (IOC / market orders)
pub const NIL_ORDER_EXPIRY: i64 = 0;
/// Order expiry marker replaced by `now + DEFAULT_ORDER_EXPIRY_MS`
pub const DEFAULT_ORDER_EXPIRY: i64 = -1;

// =============================================================================
// Orders
// =============================================================================

pub const MIN_MARKET_INDEX: i16 = 0;
pub const MAX_MARKET_INDEX: i16 = 255;

/// Also the price sentinel for market sell orders
pub const MIN_ORDER_PRICE: u32 = 1;
/// Also the price sentinel for market buy orders
pub const MAX_ORDER_PRICE: u32 = u32::MAX;

pub const MIN_BASE_AMOUNT: i64 = 1;
pub const MAX_BASE_AMOUNT: i64 = (1 << 47) - 1;
/// Base-amount marker carried by OTOCO child orders (sized by the exchange)
pub const NIL_ORDER_BASE_AMOUNT: i64 = 0;

pub const ORDER_TYPE_LIMIT: u8 = 0;
pub const ORDER_TYPE_MARKET: u8 = 1;
pub const ORDER_TYPE_STOP_LOSS: u8 = 2;
pub const ORDER_TYPE_STOP_LOSS_LIMIT: u8 = 3;
pub const ORDER_TYPE_TAKE_PROFIT: u8 = 4;
pub const ORDER_TYPE_TAKE_PROFIT_LIMIT: u8 = 5;

pub const TIF_IMMEDIATE_OR_CANCEL: u8 = 0;
pub const TIF_GOOD_TILL_TIME: u8 = 1;
pub const TIF_POST_ONLY: u8 = 2;

pub const CANCEL_ALL_TIF_IMMEDIATE: u8 = 0;
pub const CANCEL_ALL_TIF_SCHEDULED: u8 = 1;
pub const CANCEL_ALL_TIF_ABORT: u8 = 2;

pub const GROUPING_ONE_TRIGGERS_THE_OTHER: u8 = 1;
pub const GROUPING_ONE_CANCELS_THE_OTHER: u8 = 2;
pub const GROUPING_ONE_TRIGGERS_A_ONE_CANCELS_THE_OTHER: u8 = 3;

pub const MIN_GROUPED_ORDERS: usize = 1;
pub const MAX_GROUPED_ORDERS: usize = 3;

// =============================================================================
// Transfers, Withdrawals, Pools, Margin
// =============================================================================

/// Transfer memo is a fixed-size opaque blob
pub const MEMO_LENGTH: usize = 32;

pub const MIN_TRANSFER_AMOUNT: i64 = 1;
pub const MAX_TRANSFER_AMOUNT: i64 = (1 << 47) - 1;

pub const MIN_WITHDRAW_AMOUNT: u64 = 1;
pub const MAX_WITHDRAW_AMOUNT: u64 = (1 << 47) - 1;

pub const MIN_SHARE_AMOUNT: i64 = 1;
pub const MAX_SHARE_AMOUNT: i64 = (1 << 47) - 1;

/// Operator fee and share rates are expressed in basis points
pub const MAX_OPERATOR_FEE: i64 = 10_000;
pub const MAX_SHARE_RATE: i64 = 10_000;

pub const POOL_STATUS_INACTIVE: u8 = 0;
pub const POOL_STATUS_ACTIVE: u8 = 1;
pub const POOL_STATUS_FROZEN: u8 = 2;

/// InitialMarginFraction is expressed in basis points; 10_000 = 1x
pub const MAX_INITIAL_MARGIN_FRACTION: u16 = 10_000;

pub const MARGIN_MODE_CROSS: u8 = 0;
pub const MARGIN_MODE_ISOLATED: u8 = 1;

pub const MARGIN_DIRECTION_REMOVE: u8 = 0;
pub const MARGIN_DIRECTION_ADD: u8 = 1;

// =============================================================================
// Key & Signature Widths
// =============================================================================

/// Private scalar serialization width (5 LE limbs)
pub const PRIVATE_KEY_LENGTH: usize = 40;
/// Encoded ecGFp5 public point width
pub const PUBLIC_KEY_LENGTH: usize = 40;
/// Schnorr signature width: s || e, two 40-byte LE scalars
pub const SIGNATURE_LENGTH: usize = 80;
/// Poseidon2 digest width: one quintic-extension element, LE
pub const DIGEST_LENGTH: usize = 40;
