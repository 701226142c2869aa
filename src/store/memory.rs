//! In-memory corpus source for testing.

use std::collections::BTreeMap;

use crate::types::{BibleRefRecord, DocumentMeta, NetworkGraph, PersonBio, RegisterFile};
use super::CorpusSource;

/// Error type for in-memory source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Network not found.
    #[error("Network not found: {0}")]
    NetworkNotFound(String),
}

/// In-memory corpus source for testing.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpusSource {
    bible_refs: Vec<BibleRefRecord>,
    documents: Vec<DocumentMeta>,
    networks: BTreeMap<String, NetworkGraph>,
    register: RegisterFile,
    person_bios: Vec<PersonBio>,
}

impl InMemoryCorpusSource {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference record.
    pub fn add_bible_refs(&mut self, record: BibleRefRecord) {
        self.bible_refs.push(record);
    }

    /// Add a document.
    pub fn add_document(&mut self, doc: DocumentMeta) {
        self.documents.push(doc);
    }

    /// Add or replace a network.
    pub fn add_network(&mut self, name: impl Into<String>, graph: NetworkGraph) {
        self.networks.insert(name.into(), graph);
    }

    /// Replace the register.
    pub fn set_register(&mut self, register: RegisterFile) {
        self.register = register;
    }

    /// Add a person biography.
    pub fn add_person_bio(&mut self, bio: PersonBio) {
        self.person_bios.push(bio);
    }

    /// Number of reference records.
    pub fn num_records(&self) -> usize {
        self.bible_refs.len()
    }
}

impl CorpusSource for InMemoryCorpusSource {
    type Error = InMemoryError;

    fn bible_refs(&self) -> Result<Vec<BibleRefRecord>, Self::Error> {
        Ok(self.bible_refs.clone())
    }

    fn documents(&self) -> Result<Vec<DocumentMeta>, Self::Error> {
        Ok(self.documents.clone())
    }

    fn network(&self, name: &str) -> Result<NetworkGraph, Self::Error> {
        self.networks
            .get(name)
            .cloned()
            .ok_or_else(|| InMemoryError::NetworkNotFound(name.to_string()))
    }

    fn register(&self) -> Result<RegisterFile, Self::Error> {
        Ok(self.register.clone())
    }

    fn person_bios(&self) -> Result<Vec<PersonBio>, Self::Error> {
        Ok(self.person_bios.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefOccurrence;

    #[test]
    fn test_round_trip_records() {
        let mut source = InMemoryCorpusSource::new();
        source.add_bible_refs(BibleRefRecord::new("D1", vec![RefOccurrence::new("Gen", "Gen.1.1")]));
        source.add_document(DocumentMeta::new("D1"));

        assert_eq!(source.num_records(), 1);
        assert_eq!(source.bible_refs().unwrap()[0].doc_id, "D1");
        assert_eq!(source.documents().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_network() {
        let source = InMemoryCorpusSource::new();
        assert!(matches!(
            source.network("bible_document.json"),
            Err(InMemoryError::NetworkNotFound(name)) if name == "bible_document.json"
        ));
    }
}
