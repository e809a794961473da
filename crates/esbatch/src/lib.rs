//! Batching bulk-write client for Elasticsearch.
//!
//! This crate sits between application code and a remote document-indexing
//! engine. Writes are accumulated into bulk requests and flushed when a batch
//! is large enough; index-existence checks are memoized for the session.
//!
//! # Features
//!
//! - **Threshold flushing**: three flush entry points sharing one exclusive lock,
//!   so concurrent callers never send the same batch twice
//! - **Existence cache**: positive index-existence answers are remembered for
//!   the life of the client; negative answers are always re-checked
//! - **Deterministic bodies**: payloads are encoded with sorted keys and a fixed
//!   UTC timestamp format
//! - **Scoped sessions**: [`EsClient::scoped`] closes the engine on every exit path
//!
//! # Backend Features
//!
//! - `elasticsearch` (default) - Elasticsearch over HTTP
//!
//! The in-memory engine is always available.
//!
//! # Architecture
//!
//! - [`core`] - the [`IndexEngine`] trait consumed by the client
//! - [`batch`] - flush decisions ([`BatchController`])
//! - [`cache`] - existence memoization ([`ExistenceCache`])
//! - [`encode`] - payload encoding rules
//! - [`client`] - the [`EsClient`] facade
//! - [`backends`] - engine implementations
//!
//! # Quick Start
//!
//! ```
//! use esbatch::backends::memory::MemoryEngine;
//! use esbatch::{ClientConfig, EsClient};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let client = EsClient::new(ClientConfig::default(), MemoryEngine::new());
//!
//! for n in 0..5 {
//!     client
//!         .add_batch_serialized("logs", None, None, &json!({"n": n}))
//!         .unwrap();
//!     client.execute_batch(5).await.unwrap();
//! }
//!
//! assert_eq!(client.batch_count(), 0);
//! assert!(client.is_index_exist_cached("logs").await.unwrap());
//! client.close().await.unwrap();
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod batch;
pub mod cache;
pub mod client;
pub mod config;
pub mod core;
pub mod encode;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use batch::BatchController;
pub use cache::ExistenceCache;
pub use client::EsClient;
pub use config::{ClientAuth, ClientConfig};
pub use crate::core::{EngineKind, IndexEngine};
pub use error::{ClientError, ClientResult};
pub use types::{BulkItem, Mapping, SearchHit, Source};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
