//! Defaults and format limits for txview.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Expiry applied to every cache write (5 minutes).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Default key-value store host.
pub const DEFAULT_CACHE_HOST: &str = "127.0.0.1";

/// Default key-value store port.
pub const DEFAULT_CACHE_PORT: u16 = 6379;

/// Default logical database index.
pub const DEFAULT_CACHE_DB_INDEX: i64 = 0;

/// Startup connection budget for the cache store, in milliseconds.
/// Past this the process runs with caching disabled.
pub const DEFAULT_CACHE_CONNECT_TIMEOUT_MS: u64 = 2_000;

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Bound on a single upstream request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Default base endpoint for address lookups (`{base}/{address}/txs`).
pub const DEFAULT_UPSTREAM_ADDRESS_BASE_URL: &str = "http://127.0.0.1:3000/address";

/// Default base endpoint for block lookups (`{base}/{hash}/txs`).
pub const DEFAULT_UPSTREAM_BLOCK_BASE_URL: &str = "http://127.0.0.1:3000/block";

/// Default base endpoint for transaction lookups (`{base}/{txid}`).
pub const DEFAULT_UPSTREAM_TX_BASE_URL: &str = "http://127.0.0.1:3000/tx";

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIER FORMATS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of a block hash in hex characters (32 bytes).
pub const BLOCK_HASH_HEX_LEN: usize = 64;

/// Length of a transaction id in hex characters (32 bytes).
pub const TXID_HEX_LEN: usize = 64;

/// Upper bound on address length after trimming.
pub const MAX_ADDRESS_LEN: usize = 128;

/// Human-readable parts of bech32 addresses. Addresses carrying one of these
/// are case-insensitive and get folded to lowercase.
pub const BECH32_PREFIXES: &[&str] = &["bc1", "tb1", "bcrt1"];

/// Separator between namespace and identifier in a cache key.
pub const KEY_SEPARATOR: char = ':';
