//! In-memory response cache for CMS queries.
//!
//! This module provides the `ResponseCache` used by the content client.
//! Entries are keyed by the exact query string and considered fresh for
//! a fixed TTL (5 minutes by default). Stale entries are kept so they can
//! be served when a refresh fails.

pub mod manager;

pub use manager::{CacheEntry, ResponseCache, DEFAULT_TTL_SECS};
