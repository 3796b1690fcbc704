//! Lookaside cache interface
//!
//! The best-effort side of the fence. Entries carry an [`EntryFlag`] so a
//! write lock is recognizable by type, never by payload value: a reader
//! that finds [`EntryFlag::Lock`] under a key must treat the cache as
//! untrustworthy for that key and fall back to the store.

use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

pub mod keys;
pub mod lock;
pub mod memory;

/// What a cache entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum EntryFlag {
    /// Cached entity payload
    Entity = 0,
    /// Write-lock sentinel
    Lock = 1,
}

impl EntryFlag {
    /// The read-path contract: a flagged lock means "do not trust the
    /// cache for this key right now".
    pub fn is_lock(self) -> bool {
        matches!(self, EntryFlag::Lock)
    }
}

/// A single entry to place in the cache
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Derived cache key, see [`keys::lock_key`]
    pub key: String,
    /// Opaque payload
    pub value: Bytes,
    /// Entry type marker
    pub flag: EntryFlag,
    /// Expiration, enforced by the backend
    pub ttl: Duration,
}

/// Error types for cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache could not be reached
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A batched operation was rejected by the backend
    #[error("cache operation failed: {0}")]
    OperationFailed(String),
}

/// Batched access to the lookaside cache (allows mocking in tests and
/// swapping backends).
#[async_trait::async_trait]
pub trait CacheClient: Send + Sync {
    /// Set or overwrite every entry in one call
    async fn set_many(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError>;

    /// Delete every key in one call; missing keys are not an error
    async fn delete_many(&self, keys: &[String]) -> Result<(), CacheError>;
}
