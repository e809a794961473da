//! Elasticsearch engine implementation.
//!
//! Writes are buffered locally and sent through the `_bulk` endpoint as an
//! NDJSON body: one action line followed by one source line per item.
//!
//! # Failure handling
//!
//! - Transport errors and non-2xx responses leave the whole batch pending, in
//!   order, ahead of anything enqueued while the request was in flight.
//! - A 2xx response with `"errors": true` means the request was accepted but
//!   some items were rejected. The batch counts as sent; rejected items are
//!   logged and dropped.
//!
//! # Example
//!
//! ```ignore
//! use esbatch::backends::elasticsearch::ElasticsearchEngine;
//! use esbatch::{ClientConfig, EsClient};
//!
//! let config = ClientConfig::new("http://localhost:9200");
//! let engine = ElasticsearchEngine::new(&config)?;
//! let client = EsClient::new(config, engine);
//! ```

mod bulk;
mod engine;
mod mapping;

pub use bulk::BulkSummary;
pub use engine::ElasticsearchEngine;
