//! Deterministic cache key generation from query parameters.
//!
//! A fingerprint is `"{op}:{sha256hex}"` where the hash covers the operation
//! name and the canonical JSON form of the parameters. serde_json's default
//! object map is sorted by key, so two logically equal parameter sets
//! fingerprint identically regardless of field order. The `op:` prefix keeps
//! key families addressable by the pattern-based invalidation surface
//! (`search:.*`, `brands:.*`).
//!
//! The `preserve_order` feature of serde_json must stay disabled; it would
//! break key-order normalization.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::Error;

/// Compute a fingerprint for an operation and its normalized parameters.
pub fn fingerprint<T: Serialize>(op: &str, params: &T) -> Result<String, Error> {
    let canonical = serde_json::to_value(params)?;

    let mut hasher = Sha256::new();
    hasher.update(op.as_bytes());
    hasher.update(b"\n");
    hasher.update(canonical.to_string().as_bytes());
    Ok(format!("{op}:{}", hex::encode(hasher.finalize())))
}
