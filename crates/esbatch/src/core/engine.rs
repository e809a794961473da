//! Engine abstraction for remote document-indexing services.
//!
//! This module defines the [`IndexEngine`] trait, the small operation set the
//! batching core consumes. The engine owns the pending bulk queue; the core
//! only decides when to flush it and how to memoize existence probes.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{BulkItem, Mapping};

/// Identifies the type of engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// In-process engine.
    Memory,
    /// Elasticsearch cluster.
    Elasticsearch,
    /// Custom or unknown engine.
    Custom(&'static str),
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Memory => write!(f, "memory"),
            EngineKind::Elasticsearch => write!(f, "elasticsearch"),
            EngineKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A remote document-indexing engine that buffers bulk writes.
///
/// # Pending queue contract
///
/// - [`enqueue`](IndexEngine::enqueue) appends to the pending queue and never
///   talks to the remote side. After [`close`](IndexEngine::close) the write
///   is discarded with a warning and the (unchanged) pending count returned.
/// - [`flush`](IndexEngine::flush) sends everything pending in one bulk
///   request. On success the queue is empty afterwards and the number of items
///   sent is returned; flushing an empty queue is a no-op returning 0.
/// - On failure the items stay pending, in their original order, so a later
///   flush can retry them.
///
/// Callers should not invoke `flush` directly; the
/// [`BatchController`](crate::batch::BatchController) serializes flush
/// decisions so that two callers never send the same batch twice.
#[async_trait]
pub trait IndexEngine: Send + Sync + Debug {
    /// Returns the kind of engine.
    fn kind(&self) -> EngineKind;

    /// Returns a human-readable name for this engine.
    fn name(&self) -> &'static str;

    /// Number of buffered writes not yet sent.
    fn pending_count(&self) -> usize;

    /// Buffers a write and returns the pending count after insertion.
    ///
    /// A closed engine drops the write.
    fn enqueue(&self, item: BulkItem) -> usize;

    /// Sends all pending writes and returns how many were sent.
    async fn flush(&self) -> ClientResult<usize>;

    /// Checks whether an index exists.
    async fn check_exists(&self, index: &str) -> ClientResult<bool>;

    /// Lists the mappings registered for an index (or index pattern).
    ///
    /// Ordering is whatever the engine returns.
    async fn list_mappings(&self, index: &str) -> ClientResult<Vec<Mapping>>;

    /// Releases connection state. Writes still pending are discarded.
    async fn close(&self) -> ClientResult<()>;
}
