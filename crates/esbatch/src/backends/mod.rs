//! Engine implementations.
//!
//! Each engine is behind a feature flag except the in-memory one:
//!
//! - `memory` - always available
//! - `elasticsearch` (default) - Elasticsearch over HTTP via the `elasticsearch` crate

pub mod memory;

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
