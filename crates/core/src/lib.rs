//! Core types and shared functionality for motormarket.
//!
//! This crate provides:
//! - In-memory read-through cache with per-entry TTLs
//! - Unified error types
//! - Layered application configuration

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{MemoryCache, fingerprint};
pub use config::{AppConfig, CacheTtls, ConfigError, Credentials};
pub use error::Error;
