//! Annotate a batch of usage intervals with grid carbon intensity.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gc_core::{SampleSource, UsageInterval};

/// Reads a batch of usage intervals from a file, or stdin when no path is
/// given.
pub fn load_intervals(input: Option<&Path>) -> Result<Vec<UsageInterval>> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    serde_json::from_str(&raw).context("input is not a JSON array of usage intervals")
}

/// Runs the aggregation engine over the batch and writes the annotated
/// intervals as JSON.
pub async fn run<W: Write, S: SampleSource>(
    writer: &mut W,
    source: &S,
    intervals: Vec<UsageInterval>,
    pretty: bool,
) -> Result<()> {
    tracing::debug!(count = intervals.len(), "annotating batch");
    let annotated = gc_core::execute(source, intervals)
        .await
        .context("failed to annotate batch")?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&annotated)?
    } else {
        serde_json::to_string(&annotated)?
    };
    writeln!(writer, "{rendered}")?;
    Ok(())
}
