//! Entity store interface
//!
//! The durable, strongly-consistent side of the fence. Entities are
//! record-like [`Document`]s addressed by an [`EntityKey`], which is
//! either *complete* (the caller assigned an identifier) or *incomplete*
//! (the store assigns one on write).

use bson::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod memory;
pub mod mongo;

/// Hard per-call limit of the store's batched write. Batches above this
/// must be chunked by the caller before reaching the fence.
pub const MAX_PUT_BATCH: usize = 500;

// ============================================================================
// Keys
// ============================================================================

/// Identifier of an entity within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// Numeric identifier, typically store-assigned
    Int(i64),
    /// Caller-chosen or ObjectId-derived name
    Name(String),
}

impl EntityId {
    /// Stable encoded form. Tagged so `Int(42)` and `Name("42")` can
    /// never collide in a derived key.
    pub fn encoded(&self) -> String {
        match self {
            EntityId::Int(v) => format!("i{}", v),
            EntityId::Name(s) => format!("n{}", s),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(v) => write!(f, "{}", v),
            EntityId::Name(s) => write!(f, "{}", s),
        }
    }
}

/// Key of an entity in the store.
///
/// A key without an id is *incomplete*: it names a kind but no entity
/// yet, and the store assigns the identifier during the write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    /// Entity kind (maps to a collection in the MongoDB backend)
    pub kind: String,
    /// Identifier, `None` until assigned
    pub id: Option<EntityId>,
}

impl EntityKey {
    /// Key with a numeric identifier
    pub fn with_id(kind: &str, id: i64) -> Self {
        Self {
            kind: kind.to_string(),
            id: Some(EntityId::Int(id)),
        }
    }

    /// Key with a named identifier
    pub fn with_name(kind: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: Some(EntityId::Name(name.to_string())),
        }
    }

    /// Key whose identifier the store will assign on write
    pub fn incomplete(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: None,
        }
    }

    /// Whether this key fully identifies an entity
    pub fn is_complete(&self) -> bool {
        self.id.is_some()
    }

    /// Stable encoded form of a complete key, `None` if incomplete.
    /// Shared foundation for cache key derivation and in-memory indexing.
    pub fn encoded(&self) -> Option<String> {
        self.id
            .as_ref()
            .map(|id| format!("{}:{}", self.kind, id.encoded()))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}({})", self.kind, id),
            None => write!(f, "{}(incomplete)", self.kind),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error types for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Batch shape the store itself rejects
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// A write was attempted and failed
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Per-position failures, index-aligned with the input batch.
    /// `None` marks a position that succeeded.
    #[error("{} of {} batch positions failed", .0.iter().flatten().count(), .0.len())]
    Multi(Vec<Option<StoreError>>),
}

impl StoreError {
    /// Collapse a one-position multi-error to its underlying error.
    /// Anything else passes through unchanged.
    pub fn unwrap_single(self) -> StoreError {
        match self {
            StoreError::Multi(errors) if errors.len() == 1 => {
                match errors.into_iter().next().flatten() {
                    Some(err) => err,
                    None => StoreError::WriteFailed("multi-error with no failure recorded".into()),
                }
            }
            other => other,
        }
    }
}

// ============================================================================
// Store trait
// ============================================================================

/// Batched write access to the durable entity store (allows mocking in
/// tests and swapping backends).
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Write `values[i]` under `keys[i]` for every position, in one call.
    ///
    /// Returns the keys in input order with identifiers assigned to any
    /// previously incomplete key. Per-position failures are reported as
    /// [`StoreError::Multi`].
    async fn put_many(
        &self,
        keys: Vec<EntityKey>,
        values: Vec<Document>,
    ) -> Result<Vec<EntityKey>, StoreError>;
}
