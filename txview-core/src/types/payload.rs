//! Opaque JSON payloads and fetch results.

use std::fmt;
use std::sync::Arc;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TxviewError};

// ═══════════════════════════════════════════════════════════════════════════════
// PAYLOAD
// ═══════════════════════════════════════════════════════════════════════════════

/// A JSON document kept in its serialized form.
///
/// The proxy never looks inside: it is checked to be well-formed JSON once,
/// at construction, and then moved between the upstream, the cache, and the
/// caller as text. An empty result such as `[]` is a perfectly good payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload(Arc<str>);

impl Payload {
    /// Wraps `text` after checking it parses as a JSON document.
    pub fn from_json(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        serde_json::from_str::<IgnoredAny>(&text)?;
        Ok(Self(Arc::from(text)))
    }

    /// Same as [`Payload::from_json`] for raw response bytes.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| TxviewError::Validation(format!("payload is not UTF-8: {}", e)))?;
        Self::from_json(text)
    }

    /// Serializes a value into a payload.
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self(Arc::from(serde_json::to_string(value)?)))
    }

    /// The JSON text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size of the JSON text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a JSON document is never zero bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the payload into a dynamic JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.0)?)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 64;
        let end = self
            .0
            .char_indices()
            .nth(PREVIEW)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        f.debug_struct("Payload")
            .field("len", &self.0.len())
            .field("preview", &&self.0[..end])
            .finish()
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FETCH RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a successful lookup was answered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServedFrom {
    /// A live cache entry
    Cache,
    /// A fresh upstream fetch
    Upstream,
}

impl ServedFrom {
    /// Lowercase label for headers and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedFrom::Cache => "cache",
            ServedFrom::Upstream => "upstream",
        }
    }
}

impl fmt::Display for ServedFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful lookup. Failures are carried by the `Err` side of
/// [`crate::Result`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResult {
    /// The JSON document
    pub payload: Payload,
    /// Cache hit or fresh fetch
    pub served_from: ServedFrom,
}

impl FetchResult {
    /// A result answered by the cache.
    pub fn from_cache(payload: Payload) -> Self {
        Self {
            payload,
            served_from: ServedFrom::Cache,
        }
    }

    /// A result answered by the upstream.
    pub fn from_upstream(payload: Payload) -> Self {
        Self {
            payload,
            served_from: ServedFrom::Upstream,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGINATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Window into a block's transaction list. Paginated requests are forwarded
/// upstream as-is and never cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPage {
    /// First transaction index to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u64>,
    /// Maximum number of transactions to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl BlockPage {
    /// True when neither bound is set, i.e. the request is for the whole block.
    pub fn is_unbounded(&self) -> bool {
        self.start_index.is_none() && self.limit.is_none()
    }

    /// Query parameters to forward upstream.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(start) = self.start_index {
            pairs.push(("start_index", start.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}
