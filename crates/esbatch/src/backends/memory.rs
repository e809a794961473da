//! In-process engine.
//!
//! Keeps the pending queue and the committed documents in memory. Useful for
//! local runs, demos and tests that should not need a cluster. Indices are
//! created implicitly by the first flushed document or explicitly through
//! [`MemoryEngine::create_index`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};

use crate::core::{EngineKind, IndexEngine};
use crate::error::{ClientError, ClientResult};
use crate::types::{BulkItem, Mapping, Source};

#[derive(Debug, Default)]
struct StoredIndex {
    mappings: Value,
    docs: BTreeMap<String, Source>,
}

/// Engine that stores everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    pending: Mutex<Vec<BulkItem>>,
    indices: RwLock<BTreeMap<String, StoredIndex>>,
    closed: AtomicBool,
}

impl MemoryEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or replaces the mapping of) an index.
    pub fn create_index(&self, index: impl Into<String>, mappings: Value) {
        let mut indices = self.indices.write();
        indices.entry(index.into()).or_default().mappings = mappings;
    }

    /// Removes an index and its documents. Returns true if it existed.
    pub fn delete_index(&self, index: &str) -> bool {
        self.indices.write().remove(index).is_some()
    }

    /// Returns a committed document.
    pub fn document(&self, index: &str, id: &str) -> Option<Source> {
        self.indices
            .read()
            .get(index)
            .and_then(|stored| stored.docs.get(id).cloned())
    }

    /// Number of committed documents in an index (0 if it does not exist).
    pub fn document_count(&self, index: &str) -> usize {
        self.indices
            .read()
            .get(index)
            .map(|stored| stored.docs.len())
            .unwrap_or(0)
    }

    /// Returns true once [`close`](IndexEngine::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> ClientResult<()> {
        if self.is_closed() {
            return Err(ClientError::Closed {
                engine: self.name().to_string(),
            });
        }
        Ok(())
    }
}

/// Matches an index name against a name or a trailing-`*` pattern.
fn matches_pattern(pattern: &str, index: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => index.starts_with(prefix),
        None => pattern == index,
    }
}

#[async_trait]
impl IndexEngine for MemoryEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Memory
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn enqueue(&self, item: BulkItem) -> usize {
        let mut pending = self.pending.lock();
        if self.is_closed() {
            tracing::warn!(
                engine = self.name(),
                index = %item.index,
                "Write after close discarded"
            );
            return pending.len();
        }
        pending.push(item);
        pending.len()
    }

    async fn flush(&self) -> ClientResult<usize> {
        self.ensure_open()?;

        let items = std::mem::take(&mut *self.pending.lock());
        if items.is_empty() {
            return Ok(0);
        }

        let sent = items.len();
        let mut indices = self.indices.write();
        for item in items {
            let id = item
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
            let stored = indices.entry(item.index).or_insert_with(|| StoredIndex {
                mappings: json!({}),
                docs: BTreeMap::new(),
            });
            stored.docs.insert(id, item.source);
        }

        Ok(sent)
    }

    async fn check_exists(&self, index: &str) -> ClientResult<bool> {
        self.ensure_open()?;
        Ok(self.indices.read().contains_key(index))
    }

    async fn list_mappings(&self, index: &str) -> ClientResult<Vec<Mapping>> {
        self.ensure_open()?;
        Ok(self
            .indices
            .read()
            .iter()
            .filter(|(name, _)| matches_pattern(index, name))
            .map(|(name, stored)| Mapping::new(name.clone(), stored.mappings.clone()))
            .collect())
    }

    async fn close(&self) -> ClientResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let dropped = std::mem::take(&mut *self.pending.lock()).len();
        if dropped > 0 {
            tracing::warn!(engine = self.name(), dropped, "Closing with unsent bulk writes");
        }
        Ok(())
    }
}
