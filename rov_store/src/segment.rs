//! Data segments: named partitions with a fixed, declared key set.

use crate::cache::Cache;
use crate::value::Value;
use rov_common::error::{StoreError, StoreResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// One partition of the store.
///
/// Keys are declared once at creation and never grow. Values live in the
/// shared cache under `"<segment>:<key>"`.
pub struct DataSegment {
    name: String,
    keys: BTreeSet<String>,
    cache: Arc<dyn Cache>,
}

impl DataSegment {
    /// Register a segment and write every declared key's default.
    ///
    /// A key that already holds a value in the cache is overwritten; this is
    /// reported at debug level, not treated as an error.
    pub fn create<K, I>(name: &str, cache: Arc<dyn Cache>, defaults: I) -> StoreResult<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut segment = Self {
            name: name.to_owned(),
            keys: BTreeSet::new(),
            cache,
        };

        for (key, value) in defaults {
            let key = key.into();
            let cache_key = segment.cache_key(&key);
            let existed = segment
                .cache
                .exists(&cache_key)
                .map_err(|e| segment.backend(&key, e))?;
            if existed {
                debug!(segment = %segment.name, key = %key, "Key already initialised, overwriting");
            }
            let bytes = value.encode().map_err(|e| segment.backend(&key, e))?;
            segment
                .cache
                .set(&cache_key, bytes)
                .map_err(|e| segment.backend(&key, e))?;
            segment.keys.insert(key);
        }

        debug!(segment = %segment.name, keys = segment.keys.len(), "Segment created");
        Ok(segment)
    }

    /// Segment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Whether `key` is declared.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Decoded value of a declared key.
    pub fn get(&self, key: &str) -> StoreResult<Value> {
        let bytes = self.get_raw(key)?;
        Value::decode(&bytes).map_err(|e| self.backend(key, e))
    }

    /// Encode and store a value under a declared key.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> StoreResult<()> {
        self.check(key)?;
        let bytes = value.into().encode().map_err(|e| self.backend(key, e))?;
        self.write(key, bytes)
    }

    /// Every declared key with its current value.
    pub fn all(&self) -> StoreResult<BTreeMap<String, Value>> {
        self.keys
            .iter()
            .map(|key| self.get(key).map(|value| (key.clone(), value)))
            .collect()
    }

    /// Values of the requested keys. Undeclared keys are skipped with a warning.
    pub fn fetch<'a, I>(&self, keys: I) -> StoreResult<BTreeMap<String, Value>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut values = BTreeMap::new();
        for key in keys {
            if !self.contains(key) {
                warn!(segment = %self.name, key, "Skipping fetch of unregistered key");
                continue;
            }
            values.insert(key.to_owned(), self.get(key)?);
        }
        Ok(values)
    }

    /// Store every value. Undeclared keys are skipped with a warning.
    pub fn update<K, I>(&self, values: I) -> StoreResult<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        for (key, value) in values {
            let key = key.as_ref();
            if !self.contains(key) {
                warn!(segment = %self.name, key, "Skipping update of unregistered key");
                continue;
            }
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Stored bytes of a declared key, without decoding.
    pub fn get_raw(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.check(key)?;
        self.cache
            .get(&self.cache_key(key))
            .map_err(|e| self.backend(key, e))?
            .ok_or_else(|| self.backend(key, "no value stored"))
    }

    /// Store pre-encoded bytes under a declared key, without encoding.
    pub fn set_raw(&self, key: &str, bytes: Vec<u8>) -> StoreResult<()> {
        self.check(key)?;
        self.write(key, bytes)
    }

    /// Stored bytes of every declared key.
    pub fn all_raw(&self) -> StoreResult<BTreeMap<String, Vec<u8>>> {
        self.keys
            .iter()
            .map(|key| self.get_raw(key).map(|bytes| (key.clone(), bytes)))
            .collect()
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn write(&self, key: &str, bytes: Vec<u8>) -> StoreResult<()> {
        trace!(segment = %self.name, key, len = bytes.len(), "Writing key");
        self.cache
            .set(&self.cache_key(key), bytes)
            .map_err(|e| self.backend(key, e))
    }

    fn check(&self, key: &str) -> StoreResult<()> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(StoreError::NotRegistered {
                segment: self.name.clone(),
                key: key.to_owned(),
            })
        }
    }

    fn cache_key(&self, key: &str) -> String {
        format!("{}:{}", self.name, key)
    }

    fn backend(&self, key: &str, reason: impl fmt::Display) -> StoreError {
        StoreError::Backend {
            segment: self.name.clone(),
            key: key.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Debug for DataSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSegment")
            .field("name", &self.name)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
