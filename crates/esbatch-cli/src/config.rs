//! Command-line configuration for the loader.
//!
//! Every flag can also be supplied through an `ESBATCH_*` environment
//! variable.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use esbatch::{ClientAuth, ClientConfig};

/// Top-level command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "esbatch")]
#[command(about = "Batching bulk loader for Elasticsearch")]
#[command(version)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "ESBATCH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Stream NDJSON documents into an index in batches.
    Load(LoadArgs),
}

/// Arguments for `esbatch load`.
#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// Comma-separated node URLs. Only the first one is used.
    #[arg(long, env = "ESBATCH_NODES", default_value = "http://localhost:9200")]
    pub nodes: String,

    /// Target index.
    #[arg(long, env = "ESBATCH_INDEX")]
    pub index: String,

    /// Legacy mapping type. Elasticsearch 8 has none; the engine ignores it.
    #[arg(long, env = "ESBATCH_DOC_TYPE")]
    pub doc_type: Option<String>,

    /// Number of pending documents that triggers a flush.
    #[arg(long, env = "ESBATCH_BATCH_SIZE", default_value = "1000")]
    pub batch_size: usize,

    /// Document field whose value is used as the document id.
    #[arg(long, env = "ESBATCH_ID_FIELD")]
    pub id_field: Option<String>,

    /// NDJSON input file. Reads stdin when omitted or `-`.
    #[arg(long, short, env = "ESBATCH_INPUT")]
    pub input: Option<PathBuf>,

    /// Request timeout in milliseconds.
    #[arg(long, env = "ESBATCH_REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Ask the engine to refresh after every flush.
    #[arg(long, env = "ESBATCH_REFRESH", default_value = "false")]
    pub refresh: bool,

    /// Skip TLS certificate validation.
    #[arg(long, env = "ESBATCH_INSECURE", default_value = "false")]
    pub insecure: bool,

    /// Basic auth username.
    #[arg(long, env = "ESBATCH_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "ESBATCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoadArgs {
    /// Splits `--nodes` into trimmed, non-empty URLs.
    pub fn node_list(&self) -> Vec<String> {
        self.nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns true when input should come from stdin.
    pub fn reads_stdin(&self) -> bool {
        match &self.input {
            None => true,
            Some(path) => path.as_os_str() == "-",
        }
    }

    /// Builds the client configuration for this run.
    pub fn client_config(&self) -> ClientConfig {
        let auth = match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(ClientAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ClientConfig {
            nodes: self.node_list(),
            auth,
            request_timeout_ms: self.request_timeout_ms,
            disable_certificate_validation: self.insecure,
            batch_size: self.batch_size,
            refresh_on_flush: self.refresh,
        }
    }

    /// Validates the arguments and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = match self.client_config().validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        if self.index.trim().is_empty() {
            errors.push("Index name cannot be empty".to_string());
        }

        if self.username.is_some() != self.password.is_some() {
            errors.push("Username and password must be given together".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
