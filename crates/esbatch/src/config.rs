//! Client configuration.
//!
//! A [`ClientConfig`] is created once, handed to [`EsClient::new`](crate::EsClient::new)
//! and never mutated afterwards. Every field has a serde default so partial
//! JSON/TOML documents deserialize cleanly.

use serde::{Deserialize, Serialize};

/// Authentication configuration for the remote engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Connection and batching behavior for a client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Engine node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ClientAuth>,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,

    /// Default flush threshold used by
    /// [`EsClient::execute_configured_batch`](crate::EsClient::execute_configured_batch)
    /// (default: 1000).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Ask the engine to refresh affected indices after every bulk request
    /// (default: false).
    #[serde(default)]
    pub refresh_on_flush: bool,
}

fn default_nodes() -> Vec<String> {
    vec!["http://localhost:9200".to_string()]
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_batch_size() -> usize {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            auth: None,
            request_timeout_ms: default_request_timeout_ms(),
            disable_certificate_validation: false,
            batch_size: default_batch_size(),
            refresh_on_flush: false,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration pointing at a single node.
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            nodes: vec![node.into()],
            ..Default::default()
        }
    }

    /// Sets the default flush threshold.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the authentication method.
    pub fn with_auth(mut self, auth: ClientAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Returns the node the single-node pool connects to.
    pub fn primary_node(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.nodes.is_empty() {
            errors.push("At least one node URL is required".to_string());
        } else if self.nodes.iter().any(|n| n.trim().is_empty()) {
            errors.push("Node URLs cannot be empty".to_string());
        }

        if self.request_timeout_ms == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.batch_size == 0 {
            errors.push("Batch size cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
