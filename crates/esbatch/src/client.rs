//! The batching client facade.
//!
//! [`EsClient`] bundles an immutable [`ClientConfig`], the
//! [`BatchController`] that owns the engine and decides when to flush, and the
//! [`ExistenceCache`] that memoizes index-existence checks.
//!
//! Several clients may write to one engine by sharing its controller through
//! [`EsClient::with_shared_batches`]; their flushes then serialize on the same
//! lock.
//!
//! # Example
//!
//! ```
//! use esbatch::backends::memory::MemoryEngine;
//! use esbatch::{ClientConfig, EsClient, Source};
//! use serde_json::json;
//!
//! # tokio_test_block_on(async {
//! let client = EsClient::new(ClientConfig::default(), MemoryEngine::new());
//!
//! let sent = client
//!     .scoped(async |client| {
//!         let mut source = Source::new();
//!         source.insert("level".to_string(), json!("warn"));
//!         client.add_batch_auto_id("logs", None, source);
//!         client.execute_last_batch().await
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(sent, 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::batch::BatchController;
use crate::cache::ExistenceCache;
use crate::config::ClientConfig;
use crate::core::IndexEngine;
use crate::encode::{PayloadEncoder, SortedJsonEncoder, to_source};
use crate::error::ClientResult;
use crate::types::{BulkItem, Mapping, SearchHit, Source};

/// Batching write-client over an [`IndexEngine`].
pub struct EsClient<E: IndexEngine> {
    config: ClientConfig,
    batches: Arc<BatchController<E>>,
    index_cache: ExistenceCache,
    encoder: SortedJsonEncoder,
}

impl<E: IndexEngine> Debug for EsClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsClient")
            .field("config", &self.config)
            .field("engine", self.batches.engine())
            .field("cached_indices", &self.index_cache.len())
            .finish_non_exhaustive()
    }
}

impl<E: IndexEngine> EsClient<E> {
    /// Creates a client for one batching session.
    pub fn new(config: ClientConfig, engine: E) -> Self {
        Self::with_shared_batches(config, Arc::new(BatchController::new(engine)))
    }

    /// Creates a client over a controller other clients may also hold.
    ///
    /// Each client keeps its own existence cache.
    pub fn with_shared_batches(config: ClientConfig, batches: Arc<BatchController<E>>) -> Self {
        Self {
            config,
            batches,
            index_cache: ExistenceCache::new(),
            encoder: SortedJsonEncoder,
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the engine.
    pub fn engine(&self) -> &E {
        self.batches.engine()
    }

    /// Returns the controller guarding this client's flushes.
    pub fn batches(&self) -> &Arc<BatchController<E>> {
        &self.batches
    }

    /// Returns the existence cache.
    pub fn index_cache(&self) -> &ExistenceCache {
        &self.index_cache
    }

    // ------------------------------------------------------------------
    // Flushing
    // ------------------------------------------------------------------

    /// Flushes if at least `threshold` writes are pending; returns the count sent.
    pub async fn execute_batch(&self, threshold: usize) -> ClientResult<usize> {
        self.batches.execute_batch(threshold).await
    }

    /// Flushes whatever is pending; returns the count sent.
    pub async fn execute_last_batch(&self) -> ClientResult<usize> {
        self.batches.execute_last_batch().await
    }

    /// Flushes if at least `threshold` writes are pending; final-flush call site.
    pub async fn execute_last_batch_at(&self, threshold: usize) -> ClientResult<usize> {
        self.batches.execute_last_batch_at(threshold).await
    }

    /// [`execute_batch`](Self::execute_batch) with the configured `batch_size`.
    pub async fn execute_configured_batch(&self) -> ClientResult<usize> {
        self.batches.execute_batch(self.config.batch_size).await
    }

    /// Number of writes waiting for the next flush.
    pub fn batch_count(&self) -> usize {
        self.batches.pending()
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Queues a write and returns the pending count.
    ///
    /// `id: None` lets the engine generate the document id.
    pub fn add_batch(
        &self,
        index: &str,
        doc_type: Option<&str>,
        id: Option<&str>,
        source: Source,
    ) -> usize {
        let item = BulkItem {
            index: index.to_string(),
            doc_type: doc_type.map(String::from),
            id: id.map(String::from),
            source,
        };
        self.engine().enqueue(item)
    }

    /// Queues a write with an engine-generated id.
    pub fn add_batch_auto_id(&self, index: &str, doc_type: Option<&str>, source: Source) -> usize {
        self.add_batch(index, doc_type, None, source)
    }

    /// Serializes `payload` with the sorted encoder and queues it.
    pub fn add_batch_serialized<T: Serialize + ?Sized>(
        &self,
        index: &str,
        doc_type: Option<&str>,
        id: Option<&str>,
        payload: &T,
    ) -> ClientResult<usize> {
        let source = to_source(payload)?;
        Ok(self.add_batch(index, doc_type, id, source))
    }

    /// Encodes a payload exactly as it would appear in a bulk body.
    pub fn to_json_string<T: Serialize + ?Sized>(&self, payload: &T) -> ClientResult<String> {
        self.encoder.encode(&serde_json::to_value(payload)?)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Checks index existence against the engine, bypassing the cache.
    pub async fn is_index_exist(&self, index: &str) -> ClientResult<bool> {
        self.engine().check_exists(index).await
    }

    /// Checks index existence, remembering positive answers for the session.
    pub async fn is_index_exist_cached(&self, index: &str) -> ClientResult<bool> {
        self.index_cache
            .is_existing_cached(self.engine(), index)
            .await
    }

    /// Returns every mapping the engine reports for `index`.
    pub async fn get_mappings(&self, index: &str) -> ClientResult<Vec<Mapping>> {
        self.engine().list_mappings(index).await
    }

    /// Returns the first mapping for `index`, or `None` when there is none.
    ///
    /// "First" follows the engine's ordering; no further meaning is implied.
    pub async fn get_mapping(&self, index: &str) -> ClientResult<Option<Mapping>> {
        let mappings = self.get_mappings(index).await?;
        Ok(mappings.into_iter().next())
    }

    /// Returns the document body of a search hit.
    pub fn build_source<'a>(&self, hit: &'a SearchHit) -> &'a Source {
        &hit.source
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Releases the engine. Unflushed writes are discarded.
    pub async fn close(self) -> ClientResult<()> {
        let pending = self.engine().pending_count();
        if pending > 0 {
            debug!(pending, "Closing client before final flush");
        }
        self.engine().close().await
    }

    /// Runs `f` against the client and closes it afterwards, whatever `f` returned.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub async fn scoped<F, T>(self, f: F) -> ClientResult<T>
    where
        F: AsyncFnOnce(&Self) -> ClientResult<T>,
    {
        let result = f(&self).await;
        let closed = self.close().await;

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(error = %close_err, "Close failed after an earlier error");
                Err(e)
            }
        }
    }
}
