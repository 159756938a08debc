//! # Import Pipeline
//!
//! File selection → text retrieval → Row Parser → candidate contacts.
//!
//! `choose_file` is the only path from an external file into the store.
//! A cancelled selection ends the pipeline quietly; the callback only runs
//! when content was actually read and parsed.

use crate::engine::SelectionEngine;
use crate::platform::FilePicker;
use dialdeck_core::primitives::IMPORT_MIME_TYPES;
use dialdeck_core::{Contact, DialdeckError, MergeReport, RowParser};

/// Maximum import size (10 MB).
pub const MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// How a run of the pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The user cancelled the file selection.
    Cancelled,
    /// The file was parsed and handed to the callback.
    Loaded {
        /// Candidate contacts produced.
        rows: usize,
        /// Rows the parser could not decode (not UTF-8).
        skipped: usize,
    },
}

/// Let the user choose a CSV file, parse it, and call `on_loaded` once with
/// the candidate contacts.
///
/// `on_loaded` is never called when the selection is cancelled or the file
/// cannot be read.
pub async fn choose_file<P, F>(picker: &P, on_loaded: F) -> Result<ImportOutcome, DialdeckError>
where
    P: FilePicker,
    F: FnOnce(Vec<Contact>),
{
    let Some(handle) = picker.pick(&IMPORT_MIME_TYPES).await else {
        tracing::info!("Import cancelled");
        return Ok(ImportOutcome::Cancelled);
    };

    let bytes = picker.read_bytes(&handle).await?;
    if bytes.len() > MAX_IMPORT_BYTES {
        return Err(DialdeckError::ImportRead(format!(
            "Import of {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_IMPORT_BYTES
        )));
    }

    let report = RowParser::parse_bytes(&bytes);
    for row in &report.skipped {
        tracing::warn!(line = row.line, "Skipped unreadable import row: {}", row.reason);
    }
    let outcome = ImportOutcome::Loaded {
        rows: report.contacts.len(),
        skipped: report.skipped.len(),
    };
    tracing::debug!(?outcome, "Import parsed");

    on_loaded(report.contacts);
    Ok(outcome)
}

/// Run the pipeline and merge the result into the engine's store.
///
/// Returns the merge report, or `None` when the selection was cancelled.
pub async fn import_into<P: FilePicker>(
    engine: &SelectionEngine,
    picker: &P,
) -> Result<Option<MergeReport>, DialdeckError> {
    let mut loaded = None;
    let outcome = choose_file(picker, |contacts| loaded = Some(contacts)).await?;
    match outcome {
        ImportOutcome::Cancelled => Ok(None),
        ImportOutcome::Loaded { .. } => {
            let batch = loaded.unwrap_or_default();
            Ok(Some(engine.merge_import(batch).await))
        }
    }
}
