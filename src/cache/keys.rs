//! Cache key derivation
//!
//! Pure, deterministic transform from a complete entity key to the cache
//! key its write lock lives under. The read path must apply the same
//! transform to honor locks, so this is the single implementation both
//! sides depend on.

use sha2::{Digest, Sha256};

use crate::store::EntityKey;

/// Versioned prefix so a derivation change orphans old entries instead of
/// misreading them
pub const KEY_PREFIX: &str = "cachefence:1:";

/// Memcached-compatible upper bound on key length
const MAX_KEY_LEN: usize = 250;

/// Derive the cache key for an entity key, `None` if the key is
/// incomplete (no identifier exists that a cached entry could live under).
///
/// Keys whose encoded form would exceed the backend limit are replaced by
/// a hash of that form; the transform stays deterministic either way.
pub fn lock_key(key: &EntityKey) -> Option<String> {
    let encoded = key.encoded()?;
    let full = format!("{}{}", KEY_PREFIX, encoded);
    if full.len() <= MAX_KEY_LEN {
        return Some(full);
    }

    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    Some(format!("{}{}", KEY_PREFIX, hex::encode(hasher.finalize())))
}
