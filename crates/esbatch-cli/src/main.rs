//! esbatch command-line loader
//!
//! Streams newline-delimited JSON documents into Elasticsearch in batches.

mod config;
mod load;

use clap::Parser;
use esbatch::EsClient;
use esbatch::backends::elasticsearch::ElasticsearchEngine;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use crate::config::{Cli, Command, LoadArgs};
use crate::load::{LoadTarget, load_ndjson};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("esbatch={},esbatch_cli={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Opens the NDJSON source named by the arguments.
async fn open_input(args: &LoadArgs) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match &args.input {
        Some(path) if !args.reads_stdin() => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| anyhow::anyhow!("Cannot open {}: {}", path.display(), e))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

async fn run_load(args: LoadArgs) -> anyhow::Result<()> {
    let client_config = args.client_config();
    let engine = ElasticsearchEngine::new(&client_config)?;

    info!(
        nodes = ?client_config.nodes,
        index = %args.index,
        batch_size = client_config.batch_size,
        "Starting load"
    );

    let target = LoadTarget {
        index: args.index.clone(),
        doc_type: args.doc_type.clone(),
        id_field: args.id_field.clone(),
        batch_size: client_config.batch_size,
    };
    let reader = open_input(&args).await?;
    let client = EsClient::new(client_config, engine);

    // The engine is closed before either error is inspected.
    let summary = client
        .scoped(async move |client| Ok(load_ndjson(client, &target, reader).await))
        .await??;

    println!("{} documents sent to {}", summary.sent, args.index);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Load(args) => {
            if let Err(errors) = args.validate() {
                for error in &errors {
                    eprintln!("Configuration error: {}", error);
                }
                std::process::exit(1);
            }
            run_load(args).await
        }
    }
}
