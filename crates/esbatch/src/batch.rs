//! Threshold-driven flushing of pending bulk writes.
//!
//! [`BatchController`] decides, from the engine's pending count and a
//! threshold, whether to flush. The three entry points share one exclusive
//! lock: the count is read and the flush is issued inside the same critical
//! section, so two concurrent callers can never both observe a full batch and
//! send it twice.
//!
//! | Entry point | Flushes when |
//! |-------------|--------------|
//! | [`execute_batch(t)`](BatchController::execute_batch) | `pending >= t` |
//! | [`execute_last_batch()`](BatchController::execute_last_batch) | `pending > 0` |
//! | [`execute_last_batch_at(t)`](BatchController::execute_last_batch_at) | `pending >= t` |
//!
//! The controller owns its engine. Sharing an engine between clients means
//! sharing the controller (`Arc<BatchController<E>>`), so every flush of a
//! given pending queue goes through the same lock.
//!
//! Flush failures are returned as-is. Nothing is retried here.

use std::fmt::Debug;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::IndexEngine;
use crate::error::ClientResult;

/// Serializes flush decisions against the engine it owns.
pub struct BatchController<E> {
    engine: E,
    flush_lock: Mutex<()>,
}

impl<E: IndexEngine> Debug for BatchController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchController")
            .field("engine", &self.engine.name())
            .field("pending", &self.engine.pending_count())
            .finish_non_exhaustive()
    }
}

impl<E: IndexEngine> BatchController<E> {
    /// Takes ownership of `engine` and guards its flushes.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            flush_lock: Mutex::new(()),
        }
    }

    /// Returns the engine. Writes may be enqueued through it directly; flushes
    /// should go through the controller.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Flushes if at least `threshold` writes are pending.
    ///
    /// Returns the number of writes sent, or 0 when the batch was left alone.
    pub async fn execute_batch(&self, threshold: usize) -> ClientResult<usize> {
        self.flush_when("batch", |pending| pending >= threshold).await
    }

    /// Flushes whatever is pending. Intended for session teardown.
    pub async fn execute_last_batch(&self) -> ClientResult<usize> {
        self.flush_when("last", |pending| pending > 0).await
    }

    /// Final-flush variant with a threshold; same decision as
    /// [`execute_batch`](Self::execute_batch).
    pub async fn execute_last_batch_at(&self, threshold: usize) -> ClientResult<usize> {
        self.flush_when("last", |pending| pending >= threshold).await
    }

    /// Returns the engine's current pending count without locking.
    pub fn pending(&self) -> usize {
        self.engine.pending_count()
    }

    async fn flush_when<F>(&self, trigger: &'static str, should_flush: F) -> ClientResult<usize>
    where
        F: FnOnce(usize) -> bool,
    {
        let _guard = self.flush_lock.lock().await;

        let pending = self.engine.pending_count();
        if !should_flush(pending) {
            debug!(
                engine = self.engine.name(),
                trigger, pending, "Flush threshold not reached"
            );
            return Ok(0);
        }

        match self.engine.flush().await {
            Ok(sent) => {
                info!(engine = self.engine.name(), trigger, sent, "Flushed bulk batch");
                Ok(sent)
            }
            Err(e) => {
                warn!(
                    engine = self.engine.name(),
                    trigger,
                    pending,
                    error = %e,
                    "Bulk flush failed"
                );
                Err(e)
            }
        }
    }
}
