//! In-memory cache backend
//!
//! DashMap-backed with lazy TTL expiry: expired entries are dropped on
//! access rather than by a sweeper task. Backs tests and single-process
//! embedding.

use bytes::Bytes;
use dashmap::DashMap;
use std::time::Instant;

use super::{CacheClient, CacheEntry, CacheError, EntryFlag};

#[derive(Clone)]
struct StoredEntry {
    value: Bytes,
    flag: EntryFlag,
    expires_at: Instant,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Simple in-memory cache
pub struct MemoryCache {
    entries: DashMap<String, StoredEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Fetch a live entry, dropping it if expired
    pub fn get(&self, key: &str) -> Option<(Bytes, EntryFlag)> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some((entry.value.clone(), entry.flag))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries, including not-yet-collected expired ones
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheClient for MemoryCache {
    async fn set_many(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError> {
        let now = Instant::now();
        for entry in entries {
            self.entries.insert(
                entry.key,
                StoredEntry {
                    value: entry.value,
                    flag: entry.flag,
                    expires_at: now + entry.ttl,
                },
            );
        }
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError> {
        for key in keys {
            self.entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(key: &str, flag: EntryFlag, ttl: Duration) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            value: Bytes::from_static(b"payload"),
            flag,
            ttl,
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache
            .set_many(vec![entry("k1", EntryFlag::Lock, Duration::from_secs(30))])
            .await
            .unwrap();

        let (value, flag) = cache.get("k1").unwrap();
        assert_eq!(value, Bytes::from_static(b"payload"));
        assert!(flag.is_lock());
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = MemoryCache::new();
        cache
            .set_many(vec![entry("k1", EntryFlag::Entity, Duration::ZERO)])
            .await
            .unwrap();

        assert!(cache.get("k1").is_none());
        assert!(!cache.contains("k1"));
    }

    #[tokio::test]
    async fn test_delete_many() {
        let cache = MemoryCache::new();
        cache
            .set_many(vec![
                entry("k1", EntryFlag::Lock, Duration::from_secs(30)),
                entry("k2", EntryFlag::Lock, Duration::from_secs(30)),
            ])
            .await
            .unwrap();

        cache
            .delete_many(&["k1".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert!(!cache.contains("k1"));
        assert!(cache.contains("k2"));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_flag() {
        let cache = MemoryCache::new();
        cache
            .set_many(vec![entry("k1", EntryFlag::Entity, Duration::from_secs(30))])
            .await
            .unwrap();
        cache
            .set_many(vec![entry("k1", EntryFlag::Lock, Duration::from_secs(30))])
            .await
            .unwrap();

        let (_, flag) = cache.get("k1").unwrap();
        assert!(flag.is_lock());
    }
}
