//! Locked write orchestrator
//!
//! Runs the lock -> write -> unlock sequence for a batch of entities:
//!
//! ```text
//! caller ──► stage locks for complete keys
//!              │
//!              ▼ set_many (one call; failure aborts, store untouched)
//!            cache
//!              │
//!              ▼ put_many (one call; failure leaves locks to expire)
//!            store
//!              │
//!              ▼ delete_many (skipped inside a transaction;
//!            cache           failure logged, never returned)
//! ```
//!
//! The two backing-service calls are strictly sequential: a lock must be
//! placed before the store write begins, or a reader could trust a cached
//! value that the write is about to make stale. Inside a transaction the
//! unlock is skipped entirely, because the write's effect is not visible
//! until commit; the locks expire on their own.

use std::sync::Arc;

use bson::Document;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{lock, CacheClient, CacheEntry, CacheError};
use crate::config::FenceConfig;
use crate::store::{EntityKey, EntityStore, StoreError};
use crate::validate::{check_batch, ValidationError};

// ============================================================================
// Types
// ============================================================================

/// Whether the current write is nested inside a larger multi-operation
/// transaction. Threaded in explicitly; consulted once per write.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteContext {
    pub in_transaction: bool,
}

impl WriteContext {
    pub fn transactional() -> Self {
        Self {
            in_transaction: true,
        }
    }
}

/// Error types for locked writes. Backing-service errors pass through
/// unchanged so callers can apply their own retry policy.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Write-path orchestrator over an entity store and a lookaside cache.
///
/// Holds no cross-call state; every write is self-contained and
/// request-scoped. Concurrent writers to the same key each place and
/// clear their own lock.
pub struct LockedWriter<S: EntityStore, C: CacheClient> {
    store: Arc<S>,
    cache: Arc<C>,
    config: FenceConfig,
}

impl<S: EntityStore, C: CacheClient> LockedWriter<S, C> {
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self::with_config(store, cache, FenceConfig::default())
    }

    pub fn with_config(store: Arc<S>, cache: Arc<C>, config: FenceConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Write a batch of entities, fencing the cache around the store
    /// write. Returns the keys in input order with identifiers assigned
    /// to previously incomplete keys.
    pub async fn put_many(
        &self,
        keys: Vec<EntityKey>,
        values: Vec<Document>,
        ctx: WriteContext,
    ) -> Result<Vec<EntityKey>, WriteError> {
        check_batch(&keys, &values, self.config.max_batch)?;

        if keys.is_empty() {
            // Explicit no-op: neither service sees an empty request
            return Ok(Vec::new());
        }

        // Locks only for keys that already identify an entity; nothing
        // can be cached yet under an id the store has not assigned.
        let lock_entries: Vec<CacheEntry> = keys
            .iter()
            .filter_map(|key| lock::lock_entry(key, self.config.lock_ttl))
            .collect();
        let lock_keys: Vec<String> = lock_entries.iter().map(|e| e.key.clone()).collect();

        if !lock_entries.is_empty() {
            // Failure here aborts the write: proceeding unlocked would
            // open a stale-read window. Any partially placed locks
            // self-expire.
            self.cache.set_many(lock_entries).await?;
        }

        // Failure here leaves the locks to expire rather than attempting
        // a cleanup that could itself fail.
        let completed = self.store.put_many(keys, values).await?;

        if !ctx.in_transaction && !lock_keys.is_empty() {
            // Best effort: the write is already durable, and a lingering
            // lock only costs a cache-miss window until its TTL.
            if let Err(e) = self.cache.delete_many(&lock_keys).await {
                warn!(
                    error = %e,
                    locks = lock_keys.len(),
                    "failed to clear write locks; entries will expire"
                );
            }
        }

        debug!(
            entities = completed.len(),
            locked = lock_keys.len(),
            in_transaction = ctx.in_transaction,
            "locked write complete"
        );
        Ok(completed)
    }

    /// Write a single entity as a one-element batch. A per-position
    /// multi-error for the sole position is unwrapped to the underlying
    /// error; any other error is returned unchanged.
    pub async fn put(
        &self,
        key: EntityKey,
        value: Document,
        ctx: WriteContext,
    ) -> Result<EntityKey, WriteError> {
        match self.put_many(vec![key], vec![value], ctx).await {
            Ok(mut keys) => keys.pop().ok_or_else(|| {
                WriteError::Store(StoreError::WriteFailed(
                    "store returned no key for a one-entity batch".into(),
                ))
            }),
            Err(WriteError::Store(err)) => Err(WriteError::Store(err.unwrap_single())),
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
