//! Elasticsearch engine: transport setup and the [`IndexEngine`] implementation.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::indices::{IndicesExistsParts, IndicesGetMappingParts, IndicesRefreshParts};
use elasticsearch::params::Refresh;
use elasticsearch::{BulkParts, Elasticsearch};
use parking_lot::Mutex;
use serde_json::Value;

use crate::config::{ClientAuth, ClientConfig};
use crate::core::{EngineKind, IndexEngine};
use crate::error::{ClientError, ClientResult};
use crate::types::{BulkItem, Mapping};

use super::bulk::{BulkSummary, build_bulk_body, typed_items};
use super::mapping::parse_mappings;

const ENGINE_NAME: &str = "elasticsearch";

fn transport_error(message: String) -> ClientError {
    ClientError::transport(ENGINE_NAME, message)
}

/// Elasticsearch-backed engine with a local pending bulk queue.
pub struct ElasticsearchEngine {
    /// The Elasticsearch client.
    client: Elasticsearch,
    /// Writes waiting for the next flush, in enqueue order.
    pending: Mutex<Vec<BulkItem>>,
    /// Whether bulk requests ask for an immediate refresh.
    refresh_on_flush: bool,
    closed: AtomicBool,
}

impl Debug for ElasticsearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchEngine")
            .field("pending", &self.pending.lock().len())
            .field("refresh_on_flush", &self.refresh_on_flush)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ElasticsearchEngine {
    /// Creates an engine from the client configuration. Does not connect.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Self::build_client(config)?;

        tracing::info!(
            node = config.primary_node().unwrap_or_default(),
            timeout_ms = config.request_timeout_ms,
            "Elasticsearch engine configured"
        );

        Ok(Self {
            client,
            pending: Mutex::new(Vec::new()),
            refresh_on_flush: config.refresh_on_flush,
            closed: AtomicBool::new(false),
        })
    }

    /// Builds the Elasticsearch client from configuration.
    fn build_client(config: &ClientConfig) -> ClientResult<Elasticsearch> {
        let url = match config.primary_node() {
            Some(node) if !node.trim().is_empty() => node.trim().to_string(),
            _ => {
                return Err(ClientError::Configuration {
                    message: "No node URL configured".to_string(),
                });
            }
        };

        let parsed_url: elasticsearch::http::Url =
            url.parse().map_err(|e| ClientError::Configuration {
                message: format!("Invalid URL {}: {}", url, e),
            })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ClientAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ClientAuth::Bearer { token } => builder.auth(Credentials::Bearer(token.clone())),
            };
        }

        let transport = builder.build().map_err(|e| ClientError::Configuration {
            message: format!("Failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    /// Refreshes an index to make recently flushed documents searchable.
    ///
    /// Only needed for testing; in production ES refreshes automatically.
    pub async fn refresh(&self, index: &str) -> ClientResult<()> {
        self.ensure_open()?;
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| transport_error(format!("Failed to refresh index {}: {}", index, e)))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transport_error(format!(
                "Failed to refresh index {} (status {}): {}",
                index, status, body
            )));
        }
        Ok(())
    }

    fn ensure_open(&self) -> ClientResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::Closed {
                engine: ENGINE_NAME.to_string(),
            });
        }
        Ok(())
    }

    /// Puts a failed batch back at the front of the queue.
    fn restore(&self, items: Vec<BulkItem>) {
        let mut pending = self.pending.lock();
        let newer = std::mem::replace(&mut *pending, items);
        pending.extend(newer);
    }

    async fn send_bulk(&self, items: &[BulkItem]) -> ClientResult<BulkSummary> {
        let body = build_bulk_body(items);
        let mut request = self.client.bulk(BulkParts::None).body(body);
        if self.refresh_on_flush {
            request = request.refresh(Refresh::True);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(format!("Bulk request failed: {}", e)))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transport_error(format!(
                "Bulk request failed (status {}): {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| transport_error(format!("Failed to parse bulk response: {}", e)))?;

        Ok(BulkSummary::from_response(&body))
    }
}

#[async_trait]
impl IndexEngine for ElasticsearchEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Elasticsearch
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    fn enqueue(&self, item: BulkItem) -> usize {
        let mut pending = self.pending.lock();
        if self.closed.load(Ordering::SeqCst) {
            tracing::warn!(
                engine = ENGINE_NAME,
                index = %item.index,
                "Write after close discarded"
            );
            return pending.len();
        }
        pending.push(item);
        pending.len()
    }

    async fn flush(&self) -> ClientResult<usize> {
        self.ensure_open()?;

        let items = std::mem::take(&mut *self.pending.lock());
        if items.is_empty() {
            return Ok(0);
        }

        let typed = typed_items(&items);
        if typed > 0 {
            tracing::warn!(typed, "Ignoring mapping types; Elasticsearch 8 has no _type");
        }

        match self.send_bulk(&items).await {
            Ok(summary) => {
                if !summary.is_clean() {
                    tracing::warn!(
                        sent = items.len(),
                        failed = summary.failed,
                        first_error = summary.first_error.as_deref().unwrap_or("unknown"),
                        "Bulk request accepted with rejected items"
                    );
                }
                Ok(items.len())
            }
            Err(e) => {
                self.restore(items);
                Err(e)
            }
        }
    }

    async fn check_exists(&self, index: &str) -> ClientResult<bool> {
        self.ensure_open()?;
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| {
                transport_error(format!("Failed to check index existence {}: {}", index, e))
            })?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }
        Err(transport_error(format!(
            "Index existence check for {} returned status {}",
            index, status
        )))
    }

    async fn list_mappings(&self, index: &str) -> ClientResult<Vec<Mapping>> {
        self.ensure_open()?;
        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| transport_error(format!("Failed to get mapping {}: {}", index, e)))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transport_error(format!(
                "Failed to get mapping {} (status {}): {}",
                index, status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| transport_error(format!("Failed to parse mapping response: {}", e)))?;

        Ok(parse_mappings(&body))
    }

    async fn close(&self) -> ClientResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // The HTTP transport has no explicit shutdown; connections go with the client.
        let dropped = std::mem::take(&mut *self.pending.lock()).len();
        if dropped > 0 {
            tracing::warn!(engine = ENGINE_NAME, dropped, "Closing with unsent bulk writes");
        }
        tracing::debug!(engine = ENGINE_NAME, "Engine closed");
        Ok(())
    }
}
