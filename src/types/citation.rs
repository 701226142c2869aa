//! Per-document reference records produced by the reference detector.

use serde::{Deserialize, Deserializer, Serialize};

/// One detected reference inside a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefOccurrence {
    /// Book abbreviation as detected.
    #[serde(default, deserialize_with = "null_as_default")]
    pub book: String,
    /// Full OSIS text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub osis: String,
    /// Range end, when the detector saw one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_end: Option<u32>,
}

impl RefOccurrence {
    /// Create an occurrence.
    pub fn new(book: impl Into<String>, osis: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            osis: osis.into(),
            verse_end: None,
        }
    }
}

/// All references found in one document (one JSONL line).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleRefRecord {
    /// Document id (the document slug).
    #[serde(default, deserialize_with = "null_as_default")]
    pub doc_id: String,
    /// Detected references in document order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub refs: Vec<RefOccurrence>,
}

impl BibleRefRecord {
    /// Create a record.
    pub fn new(doc_id: impl Into<String>, refs: Vec<RefOccurrence>) -> Self {
        Self {
            doc_id: doc_id.into(),
            refs,
        }
    }
}

/// Synced payload written to `src/lib/data/aco-bible-refs.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleRefsPayload {
    /// Records, one per document.
    #[serde(default)]
    pub bible_refs: Vec<BibleRefRecord>,
    /// Provenance of the detector run.
    #[serde(default)]
    pub meta: BibleRefsMeta,
}

/// Missing and `null` fields both read as the type's default; the
/// aggregation skips records and occurrences left empty this way.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Metadata carried over from `bible_index.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleRefsMeta {
    /// When the detector output was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_on: Option<String>,
}
