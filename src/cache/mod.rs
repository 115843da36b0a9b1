//! Key-value cache with per-entry expiry.
//!
//! The store is a narrow contract (get/set/delete/prefix-delete) behind a
//! trait so the repository layer can be exercised against an unreachable
//! backend. [`CacheRepository`] adds JSON serialization and the fail-open
//! policy: a cache fault is a miss, never a request failure.

mod memory;
mod repository;

pub use memory::MemoryStore;
pub use repository::CacheRepository;

use async_trait::async_trait;
use thiserror::Error;

/// Named expiry policies, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// Static data - 24 hours
    Static,
    /// Semi-static data - 12 hours
    StaticTwelveHours,
    /// Semi-static data - 1 hour
    SemiStatic,
    /// Dynamic data - 15 minutes
    Dynamic,
    /// Per-user data - 5 minutes
    UserData,
    /// Near real-time data - 1 minute
    RealTime,
    /// Volatile data - 30 seconds
    Volatile,
    /// Caller-supplied TTL for ad hoc use
    Custom(i64),
}

impl CacheTtl {
    pub fn as_secs(self) -> i64 {
        match self {
            CacheTtl::Static => 60 * 60 * 24,
            CacheTtl::StaticTwelveHours => 60 * 60 * 12,
            CacheTtl::SemiStatic => 60 * 60,
            CacheTtl::Dynamic => 60 * 15,
            CacheTtl::UserData => 60 * 5,
            CacheTtl::RealTime => 60,
            CacheTtl::Volatile => 30,
            CacheTtl::Custom(secs) => secs,
        }
    }
}

/// Errors surfaced by a cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend cannot be reached. Callers treat this as a miss.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    /// Zero or negative TTL is a configuration error and fails fast.
    #[error("invalid cache ttl: {0} seconds")]
    InvalidTtl(i64),
}

/// Contract for a key-value store with per-entry expiry.
///
/// An absent and an expired key are indistinguishable: both are `None`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a key. Expired entries are treated as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value, overwriting any previous entry and resetting its expiry.
    async fn set(&self, key: &str, value: &str, ttl_secs: i64) -> Result<(), CacheError>;

    /// Remove a key. Removing an absent key is a no-op success.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key beginning with `prefix + ":"` in one logical
    /// operation. Idempotent.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}
