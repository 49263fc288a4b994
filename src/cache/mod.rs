//! Cache module for storing keyword payloads to disk
//!
//! One file per query, keyed by a digest of the whole query. Entries never
//! expire unless a max-age policy is configured.

mod manager;

pub use manager::{CacheError, CacheManager, CachePolicy, CachedPayload};
