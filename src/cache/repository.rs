//! JSON cache front used by the repositories.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use super::{CacheStore, CacheTtl};

/// Serializes values to JSON on the way into a [`CacheStore`] and back out.
///
/// Every fault degrades to a miss: an unreachable backend, a corrupt entry,
/// or a serialization failure is logged and otherwise invisible to callers.
/// Reads from the durable store must never depend on the cache being
/// reachable.
#[derive(Clone)]
pub struct CacheRepository {
    store: Arc<dyn CacheStore>,
}

impl CacheRepository {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Look up and deserialize a cached value. Absent, expired, and
    /// unreadable entries are all `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.store.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(key = %key, error = %e, "Cached value did not deserialize, treating as miss");
                None
            }
        }
    }

    /// Serialize and store a value under the given expiry policy.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: CacheTtl) {
        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to serialize value for cache");
                return;
            }
        };

        if let Err(e) = self.store.set(key, &serialized, ttl.as_secs()).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    /// Drop a single cache entry.
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            // A failed invalidation can leave a stale entry behind, which is
            // worse than a failed read.
            error!(key = %key, error = %e, "Cache invalidation failed");
        }
    }

    /// Drop every entry in a category.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        if let Err(e) = self.store.delete_prefix(prefix).await {
            error!(prefix = %prefix, error = %e, "Cache prefix invalidation failed");
        }
    }
}
