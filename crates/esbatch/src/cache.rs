//! Memoized index-existence checks.
//!
//! # Staleness contract
//!
//! Only positive answers are cached, and they are never invalidated: once an
//! index is seen to exist it is assumed to exist for the lifetime of the
//! client. An index deleted out-of-band after being cached is still reported
//! as existing. Negative answers are never cached, so an index that does not
//! exist yet is re-checked on every call until it appears.
//!
//! The membership set only grows. Concurrent callers probing the same unseen
//! index may each hit the engine once; inserting the same name twice is
//! harmless.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::core::IndexEngine;
use crate::error::ClientResult;

/// Grow-only set of index names known to exist.
#[derive(Debug, Default)]
pub struct ExistenceCache {
    known: RwLock<HashSet<String>>,
}

impl ExistenceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `index` exists, consulting the engine only on a miss.
    ///
    /// Engine errors are returned unchanged and nothing is cached.
    pub async fn is_existing_cached<E>(&self, engine: &E, index: &str) -> ClientResult<bool>
    where
        E: IndexEngine + ?Sized,
    {
        if self.contains(index) {
            return Ok(true);
        }

        let exists = engine.check_exists(index).await?;
        if exists {
            self.known.write().insert(index.to_string());
            tracing::debug!(engine = engine.name(), index, "Cached index existence");
        }
        Ok(exists)
    }

    /// Returns true if `index` is already cached.
    pub fn contains(&self, index: &str) -> bool {
        self.known.read().contains(index)
    }

    /// Number of cached index names.
    pub fn len(&self) -> usize {
        self.known.read().len()
    }

    /// Returns true if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.known.read().is_empty()
    }
}
