//! Error types for the batching client.
//!
//! Every remote failure surfaces as [`ClientError::Transport`]. The client never
//! retries on its own; callers decide whether and when to try again. An absent
//! mapping is not an error and is represented by `Option::None` instead.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or server failure while talking to the remote engine.
    #[error("transport error in {engine}: {message}")]
    Transport {
        engine: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A payload could not be encoded into a bulk source document.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// The client configuration is unusable (bad URL, transport build failure).
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    /// The engine has already been closed.
    #[error("{engine} engine is closed")]
    Closed { engine: String },
}

impl ClientError {
    /// Builds a [`ClientError::Transport`] without an underlying source.
    pub fn transport(engine: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Transport {
            engine: engine.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for errors raised by the remote round-trip.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "elasticsearch")]
impl From<elasticsearch::Error> for ClientError {
    fn from(err: elasticsearch::Error) -> Self {
        ClientError::Transport {
            engine: "elasticsearch".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
