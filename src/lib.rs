//! Cachefence - write-path cache consistency fence
//!
//! Sits between application code and two backing services: a durable,
//! strongly-consistent entity store and a best-effort lookaside cache.
//! Before a batch is written to the store, a short-lived lock entry is
//! placed in the cache for every already-identified key; readers that see
//! a lock (or nothing) must fall back to the store. The locks are removed
//! once the write has succeeded, unless the write ran inside a larger
//! transaction, in which case they are left to expire with the commit.
//!
//! ## Layers
//!
//! - **Lock primitive** ([`cache::lock`], [`cache::keys`]): derives the
//!   cache key for an entity key and stages the sentinel lock entry
//! - **Locked writer** ([`write::LockedWriter`]): runs the
//!   lock -> write -> unlock sequence against any [`EntityStore`] and
//!   [`CacheClient`] implementation
//!
//! Backends provided here: [`store::mongo::MongoStore`] (durable),
//! [`store::memory::MemoryStore`] and [`cache::memory::MemoryCache`]
//! (in-process, for tests and embedding).

pub mod cache;
pub mod config;
pub mod store;
pub mod validate;
pub mod write;

pub use cache::{CacheClient, CacheEntry, CacheError, EntryFlag};
pub use config::FenceConfig;
pub use store::{EntityId, EntityKey, EntityStore, StoreError, MAX_PUT_BATCH};
pub use validate::ValidationError;
pub use write::{LockedWriter, WriteContext, WriteError};
