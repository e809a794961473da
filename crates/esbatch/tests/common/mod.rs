//! Shared test engine.
//!
//! `ScriptedEngine` records every remote call so tests can assert on how
//! often the client actually reached the engine, and lets tests inject flush
//! failures and slow flushes. Engines are owned by their controller, so tests
//! reach the engine through `controller.engine()`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use esbatch::{
    BatchController, BulkItem, ClientError, ClientResult, EngineKind, IndexEngine, Mapping, Source,
};

#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pending: Mutex<Vec<BulkItem>>,
    sent: Mutex<Vec<BulkItem>>,
    existing: Mutex<HashMap<String, bool>>,
    mappings: Mutex<Vec<Mapping>>,
    fail_next_flushes: AtomicUsize,
    fail_exists: AtomicBool,
    fail_close: AtomicBool,
    flush_delay_ms: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    pub flush_calls: AtomicUsize,
    pub exists_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, n: usize) {
        for _ in 0..n {
            self.enqueue(BulkItem::new("test", Source::new()));
        }
    }

    pub fn set_exists(&self, index: &str, exists: bool) {
        self.existing.lock().insert(index.to_string(), exists);
    }

    pub fn set_mappings(&self, mappings: Vec<Mapping>) {
        *self.mappings.lock() = mappings;
    }

    pub fn fail_next_flushes(&self, n: usize) {
        self.fail_next_flushes.store(n, Ordering::SeqCst);
    }

    pub fn fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    pub fn set_flush_delay(&self, delay: Duration) {
        self.flush_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<BulkItem> {
        self.sent.lock().clone()
    }

    pub fn flushes(&self) -> usize {
        self.flush_calls.load(Ordering::SeqCst)
    }

    pub fn exists_checks(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Highest number of flushes observed running at the same time.
    pub fn max_concurrent_flushes(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn flush_inner(&self) -> ClientResult<usize> {
        // Snapshot first, then yield, so overlapping flushes would see the same batch.
        let snapshot = self.pending.lock().len();
        let delay = self.flush_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }

        let failing = self
            .fail_next_flushes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ClientError::transport("scripted", "injected flush failure"));
        }

        let items: Vec<BulkItem> = {
            let mut pending = self.pending.lock();
            let take = snapshot.min(pending.len());
            pending.drain(..take).collect()
        };
        let count = items.len();
        self.sent.lock().extend(items);
        Ok(count)
    }
}

#[async_trait]
impl IndexEngine for ScriptedEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Custom("scripted")
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn enqueue(&self, item: BulkItem) -> usize {
        let mut pending = self.pending.lock();
        pending.push(item);
        pending.len()
    }

    async fn flush(&self) -> ClientResult<usize> {
        self.flush_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let result = self.flush_inner().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn check_exists(&self, index: &str) -> ClientResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(ClientError::transport("scripted", "injected probe failure"));
        }
        Ok(self.existing.lock().get(index).copied().unwrap_or(false))
    }

    async fn list_mappings(&self, _index: &str) -> ClientResult<Vec<Mapping>> {
        Ok(self.mappings.lock().clone())
    }

    async fn close(&self) -> ClientResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(ClientError::transport("scripted", "injected close failure"));
        }
        Ok(())
    }
}

pub fn source(value: Value) -> Source {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Source::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

pub fn mapping(index: &str) -> Mapping {
    Mapping::new(index, json!({"properties": {"name": {"type": "keyword"}}}))
}

/// A controller over a fresh scripted engine, shareable between clients.
pub fn controller() -> Arc<BatchController<ScriptedEngine>> {
    Arc::new(BatchController::new(ScriptedEngine::new()))
}
