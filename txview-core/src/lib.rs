//! # txview Core
//!
//! Core types, errors, and traits shared by every txview crate.
//!
//! - **Types**: lookup keys, opaque JSON payloads, fetch results, cache statistics
//! - **Errors**: the validation / upstream / cache error taxonomy
//! - **Constants**: defaults for TTLs, timeouts, and identifier formats
//! - **Traits**: the cache store and upstream fetcher seams
//!
//! ## Example
//!
//! ```rust
//! use txview_core::{LookupKey, Namespace};
//!
//! let key = LookupKey::new(Namespace::Address, "  addr1 ").unwrap();
//! assert_eq!(key.as_str(), "address:addr1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, TxviewError, UpstreamError, UpstreamResult};
pub use traits::*;
pub use types::*;
