//! NDJSON loading.

use anyhow::Context;
use esbatch::{EsClient, IndexEngine, Source};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Where documents go and how ids are picked.
#[derive(Debug, Clone)]
pub struct LoadTarget {
    /// Target index.
    pub index: String,
    /// Optional legacy mapping type.
    pub doc_type: Option<String>,
    /// Field holding the document id, if any.
    pub id_field: Option<String>,
    /// Flush threshold.
    pub batch_size: usize,
}

/// Totals for one load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Documents queued.
    pub read: usize,
    /// Documents handed to the engine.
    pub sent: usize,
    /// Blank lines skipped.
    pub skipped: usize,
}

/// Streams NDJSON lines from `reader` into the client.
///
/// A flush is attempted after every queued document; the remainder is flushed
/// once the input ends. A line that is not a JSON object aborts the run.
pub async fn load_ndjson<E, R>(
    client: &EsClient<E>,
    target: &LoadTarget,
    reader: R,
) -> anyhow::Result<LoadSummary>
where
    E: IndexEngine,
    R: AsyncBufRead + Unpin,
{
    let mut summary = LoadSummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let source =
            parse_line(trimmed).with_context(|| format!("Invalid document on line {line_no}"))?;
        let id = target
            .id_field
            .as_deref()
            .and_then(|field| document_id(&source, field));
        if target.id_field.is_some() && id.is_none() {
            debug!(line = line_no, "Id field missing, using generated id");
        }

        client.add_batch(&target.index, target.doc_type.as_deref(), id.as_deref(), source);
        summary.read += 1;

        summary.sent += client
            .execute_batch(target.batch_size)
            .await
            .with_context(|| format!("Bulk flush failed after line {line_no}"))?;
    }

    summary.sent += client
        .execute_last_batch()
        .await
        .context("Final bulk flush failed")?;

    if summary.sent != summary.read {
        warn!(read = summary.read, sent = summary.sent, "Not every document was sent");
    }
    info!(
        index = %target.index,
        read = summary.read,
        sent = summary.sent,
        skipped = summary.skipped,
        "Load finished"
    );

    Ok(summary)
}

fn parse_line(line: &str) -> anyhow::Result<Source> {
    match serde_json::from_str::<Value>(line)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, found {}", kind_of(&other)),
    }
}

/// Reads the id from `field`. Strings are used as-is, numbers are rendered.
fn document_id(source: &Source, field: &str) -> Option<String> {
    match source.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
