//! Core engine abstraction.
//!
//! The batching client never talks HTTP itself. Everything remote goes
//! through an [`IndexEngine`], which owns the pending bulk queue and performs
//! the actual round-trips:
//!
//! - [`MemoryEngine`](crate::backends::memory::MemoryEngine) - in-process engine for local runs and tests
//! - [`ElasticsearchEngine`](crate::backends::elasticsearch::ElasticsearchEngine) - the real remote engine

mod engine;

pub use engine::{EngineKind, IndexEngine};
