//! Namespaces, identifier rules, and cache keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BECH32_PREFIXES, BLOCK_HASH_HEX_LEN, KEY_SEPARATOR, MAX_ADDRESS_LEN, TXID_HEX_LEN,
};
use crate::error::{Result, TxviewError};

// ═══════════════════════════════════════════════════════════════════════════════
// NAMESPACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Partition of the key space. Identical identifiers in different
/// namespaces never share a cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Transactions touching an address
    Address,
    /// Transactions contained in a block
    Block,
    /// A single transaction
    Tx,
    /// Block header fields (height, difficulty, bits, ...)
    BlockInfo,
}

impl Namespace {
    /// Every namespace, in key-space order.
    pub const ALL: [Namespace; 4] = [
        Namespace::Address,
        Namespace::Block,
        Namespace::Tx,
        Namespace::BlockInfo,
    ];

    /// The tag used as the cache key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Address => "address",
            Namespace::Block => "block",
            Namespace::Tx => "tx",
            Namespace::BlockInfo => "block_info",
        }
    }

    /// Glob matching every cache key in this namespace.
    pub fn key_pattern(&self) -> String {
        format!("{}{}*", self.as_str(), KEY_SEPARATOR)
    }

    /// Validates `raw` against this namespace's format rule and returns the
    /// normalized identifier.
    pub fn normalize(&self, raw: &str) -> Result<String> {
        match self {
            Namespace::Address => normalize_address(raw),
            Namespace::Block | Namespace::BlockInfo => normalize_block_hash(raw),
            Namespace::Tx => normalize_txid(raw),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = TxviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "address" => Ok(Namespace::Address),
            "block" => Ok(Namespace::Block),
            "tx" => Ok(Namespace::Tx),
            "block_info" | "block-info" => Ok(Namespace::BlockInfo),
            other => Err(TxviewError::Validation(format!("unknown namespace '{}'", other))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIER RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// Trims an address and checks it is 1..=128 ASCII alphanumerics.
///
/// Bech32 addresses are case-insensitive and are folded to lowercase;
/// base58 addresses are case-sensitive and kept as given.
pub fn normalize_address(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(TxviewError::Validation("address cannot be empty".into()));
    }
    if trimmed.len() > MAX_ADDRESS_LEN {
        return Err(TxviewError::Validation(format!(
            "address too long: {} characters (max {})",
            trimmed.len(),
            MAX_ADDRESS_LEN
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TxviewError::Validation(
            "address must contain only alphanumeric characters".into(),
        ));
    }

    let lower = trimmed.to_ascii_lowercase();
    if BECH32_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        Ok(lower)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trims a block hash, checks it is exactly 64 hex characters, and lowercases it.
pub fn normalize_block_hash(raw: &str) -> Result<String> {
    normalize_hex_id(raw, "block hash", BLOCK_HASH_HEX_LEN)
}

/// Trims a transaction id, checks it is exactly 64 hex characters, and lowercases it.
pub fn normalize_txid(raw: &str) -> Result<String> {
    normalize_hex_id(raw, "transaction id", TXID_HEX_LEN)
}

fn normalize_hex_id(raw: &str, what: &str, len: usize) -> Result<String> {
    let trimmed = raw.trim();

    if trimmed.len() != len {
        return Err(TxviewError::Validation(format!(
            "{} must be {} hex characters, got {}",
            what,
            len,
            trimmed.len()
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TxviewError::Validation(format!(
            "{} must contain only hex characters",
            what
        )));
    }

    Ok(trimmed.to_ascii_lowercase())
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated `(namespace, identifier)` pair and its cache key
/// `"{namespace}:{normalized_identifier}"`.
///
/// Construction is the only place identifiers are validated, so holding a
/// `LookupKey` means the identifier is well-formed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LookupKey {
    namespace: Namespace,
    identifier: String,
    key: String,
}

impl LookupKey {
    /// Validates and normalizes `raw`, then builds the key.
    pub fn new(namespace: Namespace, raw: &str) -> Result<Self> {
        let identifier = namespace.normalize(raw)?;
        let key = format!("{}{}{}", namespace.as_str(), KEY_SEPARATOR, identifier);
        Ok(Self {
            namespace,
            identifier,
            key,
        })
    }

    /// Shorthand for an address key.
    pub fn address(raw: &str) -> Result<Self> {
        Self::new(Namespace::Address, raw)
    }

    /// Shorthand for a block key.
    pub fn block(raw: &str) -> Result<Self> {
        Self::new(Namespace::Block, raw)
    }

    /// Shorthand for a transaction key.
    pub fn tx(raw: &str) -> Result<Self> {
        Self::new(Namespace::Tx, raw)
    }

    /// Shorthand for a block-info key.
    pub fn block_info(raw: &str) -> Result<Self> {
        Self::new(Namespace::BlockInfo, raw)
    }

    /// The namespace this key lives in.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The normalized identifier (what is sent upstream).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The full cache key.
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for LookupKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
