//! Reference payload: detector JSONL plus index metadata into one JSON file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::config::ProjectLayout;
use crate::store::{read_json, read_jsonl};
use crate::types::BibleRefsMeta;
use super::{write_file, SyncError, SyncReport};

/// Payload written for the web app.
///
/// Records are kept as raw JSON so fields the page does not read survive
/// the sync unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleRefsSyncPayload {
    /// One record per document.
    pub bible_refs: Vec<Value>,
    /// Generation metadata.
    pub meta: BibleRefsMeta,
}

/// `generated_on` of the detector's index file, if the file exists and has one.
fn generated_on(layout: &ProjectLayout) -> Result<Option<String>, SyncError> {
    let path = layout.resolve(&layout.paths().bible_index);
    match read_json::<Value>(&path) {
        Ok(index) => Ok(index
            .get("generated_on")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(SyncError::Source(e)),
    }
}

/// Build the payload from the pipeline output without writing it.
pub fn build_payload(layout: &ProjectLayout) -> Result<BibleRefsSyncPayload, SyncError> {
    let jsonl = layout.resolve(&layout.paths().bible_refs_jsonl);
    let bible_refs: Vec<Value> =
        read_jsonl(&jsonl).map_err(|e| SyncError::parse(&jsonl, e))?;

    Ok(BibleRefsSyncPayload {
        bible_refs,
        meta: BibleRefsMeta {
            generated_on: generated_on(layout)?,
        },
    })
}

/// Write the reference payload.
pub fn sync_bible_refs(layout: &ProjectLayout) -> Result<SyncReport, SyncError> {
    let payload = build_payload(layout)?;
    let dest = layout.resolve(&layout.paths().bible_refs_payload);
    let bytes = serde_json::to_vec_pretty(&payload)?;

    let entry = write_file(layout, &dest, &bytes)?;
    info!(
        records = payload.bible_refs.len(),
        target = %entry.path,
        status = %entry.status,
        "synced bible refs"
    );

    let mut report = SyncReport::new();
    report.push(entry);
    Ok(report)
}
