//! In-memory read-through cache for upstream query results.
//!
//! This module provides an ephemeral, TTL-bounded cache keyed by query
//! fingerprints. It supports:
//!
//! - Deterministic fingerprints from normalized query parameters
//! - Read-through `get_or_compute` with per-call TTL overrides
//! - Pattern-based invalidation (regex over keys)
//! - Passive expiry on read plus a periodic sweep task
//!
//! Entries are rebuildable from the upstream API at any time; nothing here
//! survives a restart.

pub mod fingerprint;
pub mod store;

pub use crate::Error;

pub use fingerprint::fingerprint;
pub use store::{MemoryCache, spawn_sweeper};
