//! Batch shape validation
//!
//! Runs before any backing-service call: a malformed batch must never
//! place a lock or touch the store.

use bson::Document;
use thiserror::Error;

use crate::store::EntityKey;

/// Error types for batch validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Keys and values are not index-aligned
    #[error("mismatched batch: {keys} keys against {values} values")]
    MismatchedBatch { keys: usize, values: usize },

    /// Batch exceeds the store's hard per-call limit
    #[error("batch of {size} entities exceeds the per-call limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },
}

/// Check that a batch is index-aligned and within the per-call limit.
/// Chunking above the limit is the caller's responsibility.
pub fn check_batch(
    keys: &[EntityKey],
    values: &[Document],
    limit: usize,
) -> Result<(), ValidationError> {
    if keys.len() != values.len() {
        return Err(ValidationError::MismatchedBatch {
            keys: keys.len(),
            values: values.len(),
        });
    }
    if keys.len() > limit {
        return Err(ValidationError::BatchTooLarge {
            size: keys.len(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_aligned_batch_passes() {
        let keys = vec![EntityKey::with_id("Post", 1)];
        let values = vec![doc! { "title": "Hello" }];
        assert_eq!(check_batch(&keys, &values, 500), Ok(()));
    }

    #[test]
    fn test_empty_batch_passes() {
        assert_eq!(check_batch(&[], &[], 500), Ok(()));
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let keys = vec![EntityKey::with_id("Post", 1), EntityKey::with_id("Post", 2)];
        let values = vec![doc! {}];
        assert_eq!(
            check_batch(&keys, &values, 500),
            Err(ValidationError::MismatchedBatch { keys: 2, values: 1 })
        );
    }

    #[test]
    fn test_oversized_batch_rejected() {
        let keys: Vec<_> = (0..3).map(|i| EntityKey::with_id("Post", i)).collect();
        let values: Vec<_> = (0..3).map(|_| doc! {}).collect();
        assert_eq!(
            check_batch(&keys, &values, 2),
            Err(ValidationError::BatchTooLarge { size: 3, limit: 2 })
        );
    }
}
