//! Configuration for the fence

use std::time::Duration;

use crate::cache::lock::LOCK_TTL;
use crate::store::MAX_PUT_BATCH;

/// Tunables for [`crate::write::LockedWriter`]
#[derive(Debug, Clone)]
pub struct FenceConfig {
    /// Lock entry expiration (default: 32 seconds)
    pub lock_ttl: Duration,
    /// Largest batch accepted per call, capped at the store's hard limit
    pub max_batch: usize,
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            lock_ttl: LOCK_TTL,
            max_batch: MAX_PUT_BATCH,
        }
    }
}

impl FenceConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CACHEFENCE_LOCK_TTL_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.lock_ttl = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("CACHEFENCE_MAX_BATCH") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_batch = n.min(MAX_PUT_BATCH);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_constants() {
        let config = FenceConfig::default();
        assert_eq!(config.lock_ttl, Duration::from_secs(32));
        assert_eq!(config.max_batch, 500);
    }
}
