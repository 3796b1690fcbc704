//! Write-lock primitive
//!
//! A lock is a short-lived cache entry marking "this key's cached value,
//! if any, must not be trusted right now". It is placed before the store
//! write and removed after a successful non-transactional write; if
//! removal is ever skipped or lost, the TTL heals the entry on its own.

use bytes::Bytes;
use std::time::Duration;

use super::{keys, CacheEntry, EntryFlag};
use crate::store::EntityKey;

/// Lock expiration: long enough to outlast a store write, short enough
/// that a dropped unlock cannot poison the cache for long.
pub const LOCK_TTL: Duration = Duration::from_secs(32);

const LOCK_SENTINEL: &[u8] = b"cachefence-write-lock";

/// Fixed sentinel payload. Locks are identified by [`EntryFlag::Lock`],
/// not by this value; the payload exists so the entry is non-empty and
/// recognizable when inspected.
pub fn lock_payload() -> Bytes {
    Bytes::from_static(LOCK_SENTINEL)
}

/// Stage a lock entry for a complete key, `None` for an incomplete one.
pub fn lock_entry(key: &EntityKey, ttl: Duration) -> Option<CacheEntry> {
    keys::lock_key(key).map(|cache_key| CacheEntry {
        key: cache_key,
        value: lock_payload(),
        flag: EntryFlag::Lock,
        ttl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_entry_is_flagged() {
        let entry = lock_entry(&EntityKey::with_id("Post", 1), LOCK_TTL).unwrap();
        assert!(entry.flag.is_lock());
        assert_eq!(entry.value, lock_payload());
        assert_eq!(entry.ttl, LOCK_TTL);
    }

    #[test]
    fn test_lock_entry_key_matches_derivation() {
        let key = EntityKey::with_name("Post", "slug");
        let entry = lock_entry(&key, LOCK_TTL).unwrap();
        assert_eq!(entry.key, keys::lock_key(&key).unwrap());
    }

    #[test]
    fn test_no_lock_for_incomplete_key() {
        assert!(lock_entry(&EntityKey::incomplete("Post"), LOCK_TTL).is_none());
    }
}
