//! Domain types for txview.
//!
//! - [`Namespace`] / [`LookupKey`]: what is being looked up, and where it lives in the cache
//! - [`Payload`]: an opaque, validated JSON document
//! - [`FetchResult`]: a payload plus where it was served from
//! - [`CacheStats`], [`ClearReport`], [`HealthReport`]: administrative reports

mod lookup;
mod payload;
mod report;

pub use lookup::*;
pub use payload::*;
pub use report::*;
