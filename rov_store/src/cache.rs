//! Byte-level cache backends.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Failure reported by a cache backend.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Backend could not serve the request.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key/value cache holding pre-serialised values.
///
/// Every call is atomic for its key. No multi-key atomicity is offered.
pub trait Cache: Send + Sync {
    /// Read the bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Whether `key` holds a value.
    fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove `key`. Returns whether it was present.
    fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// In-process cache backend.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.write().insert(key.to_owned(), value);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.read().contains_key(key))
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());

        cache.set("control:manual-yaw", vec![1, 2, 3]).unwrap();
        assert!(cache.exists("control:manual-yaw").unwrap());
        assert_eq!(cache.get("control:manual-yaw").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(cache.len(), 1);

        assert!(cache.delete("control:manual-yaw").unwrap());
        assert!(!cache.delete("control:manual-yaw").unwrap());
        assert_eq!(cache.get("control:manual-yaw").unwrap(), None);
    }

    #[test]
    fn set_overwrites() {
        let cache = MemoryCache::new();
        cache.set("k", vec![0]).unwrap();
        cache.set("k", vec![9, 9]).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(vec![9, 9]));
    }
}
