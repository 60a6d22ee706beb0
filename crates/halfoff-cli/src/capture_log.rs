//! Capture-log ingestion: one intercepted-response JSON object per line,
//! written by the browser-orchestration layer during page load.
//!
//! Ingestion is lenient by design — a corrupt line loses that one capture,
//! never the run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use halfoff_engine::{CaptureBuffer, CapturedResponse};

/// Reads a capture log and offers every decodable line to the buffer.
///
/// Returns `(offered, retained)` counts for operational logging.
///
/// # Errors
///
/// Returns an error only when the log file itself cannot be read — a
/// collaborator-contract violation, unlike per-line decode failures, which
/// are skipped with a warning.
pub fn load_into(path: &Path, buffer: &mut CaptureBuffer) -> anyhow::Result<(usize, usize)> {
    let file = File::open(path)
        .with_context(|| format!("cannot open capture log {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut offered = 0usize;
    let mut retained = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("cannot read capture log {}", path.display()))?;
        let Some(response) = decode_line(&line, index + 1) else {
            continue;
        };
        offered += 1;
        if buffer.push(response) {
            retained += 1;
        }
    }

    Ok((offered, retained))
}

/// Decodes one log line. Blank lines and undecodable lines yield `None`;
/// the latter are logged with their line number.
fn decode_line(line: &str, line_number: usize) -> Option<CapturedResponse> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<CapturedResponse>(trimmed) {
        Ok(response) => Some(response),
        Err(e) => {
            tracing::warn!(line = line_number, error = %e, "skipping unparseable capture-log line");
            None
        }
    }
}
