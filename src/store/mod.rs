//! Corpus sources: where the page loaders read their inputs from.

pub mod memory;
pub mod fs;

use crate::types::{BibleRefRecord, DocumentMeta, NetworkGraph, PersonBio, RegisterFile};

/// Read access to the pre-built corpus artifacts.
///
/// Implementations return data exactly as stored; joining, sorting and
/// labeling happen in [`crate::atlas`].
pub trait CorpusSource: Send + Sync {
    /// Error type for source operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reference records, one per document.
    fn bible_refs(&self) -> Result<Vec<BibleRefRecord>, Self::Error>;

    /// Document metadata.
    fn documents(&self) -> Result<Vec<DocumentMeta>, Self::Error>;

    /// A named network graph (e.g. `bible_document.json`).
    fn network(&self, name: &str) -> Result<NetworkGraph, Self::Error>;

    /// The person/place register.
    fn register(&self) -> Result<RegisterFile, Self::Error>;

    /// Person biographies.
    fn person_bios(&self) -> Result<Vec<PersonBio>, Self::Error>;
}

pub use memory::{InMemoryCorpusSource, InMemoryError};
pub use fs::{FsCorpusSource, SourceError, read_json, read_jsonl};
