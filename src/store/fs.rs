//! Filesystem corpus source reading the web app's data files.

use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ProjectLayout;
use crate::types::{
    BibleRefRecord, BibleRefsPayload, DocumentMeta, MetadataFile, NetworkGraph, PersonBio,
    PersonBiosFile, RegisterFile,
};
use super::CorpusSource;

/// Errors raised while reading corpus files.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// File is not valid JSON for the expected shape.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A JSONL line is not valid JSON for the expected shape.
    #[error("invalid JSON in {path} at line {line}: {source}")]
    JsonLine {
        /// File path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// Whether the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON Lines file, skipping blank lines.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| SourceError::JsonLine {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })
        })
        .collect()
}

/// Corpus source over a project directory.
#[derive(Debug, Clone)]
pub struct FsCorpusSource {
    layout: ProjectLayout,
}

impl FsCorpusSource {
    /// Create a source over a project layout.
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    /// The project layout.
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Read the first of two candidate files that exists.
    fn read_preferred<T: DeserializeOwned>(
        &self,
        preferred: &Path,
        fallback: &Path,
    ) -> Result<T, SourceError> {
        let preferred = self.layout.resolve(preferred);
        match read_json(&preferred) {
            Err(e) if e.is_not_found() => {
                let fallback = self.layout.resolve(fallback);
                debug!(
                    missing = %self.layout.display_path(&preferred),
                    fallback = %self.layout.display_path(&fallback),
                    "falling back to pipeline output"
                );
                read_json(&fallback)
            }
            other => other,
        }
    }
}

impl CorpusSource for FsCorpusSource {
    type Error = SourceError;

    /// Prefers the synced payload; reads the detector JSONL when it is missing.
    fn bible_refs(&self) -> Result<Vec<BibleRefRecord>, Self::Error> {
        let paths = self.layout.paths();
        let payload_path = self.layout.resolve(&paths.bible_refs_payload);
        match read_json::<BibleRefsPayload>(&payload_path) {
            Ok(payload) => Ok(payload.bible_refs),
            Err(e) if e.is_not_found() => {
                let jsonl = self.layout.resolve(&paths.bible_refs_jsonl);
                debug!(
                    path = %self.layout.display_path(&jsonl),
                    "reference payload not synced, reading detector output"
                );
                read_jsonl(&jsonl)
            }
            Err(e) => Err(e),
        }
    }

    fn documents(&self) -> Result<Vec<DocumentMeta>, Self::Error> {
        let path = self.layout.resolve(&self.layout.paths().metadata);
        Ok(read_json::<MetadataFile>(&path)?.meta_data)
    }

    fn network(&self, name: &str) -> Result<NetworkGraph, Self::Error> {
        read_json(&self.layout.network(name))
    }

    fn register(&self) -> Result<RegisterFile, Self::Error> {
        read_json(&self.layout.resolve(&self.layout.paths().register_geo))
    }

    fn person_bios(&self) -> Result<Vec<PersonBio>, Self::Error> {
        let paths = self.layout.paths();
        let file: PersonBiosFile =
            self.read_preferred(&paths.person_bios, &paths.person_bios_source)?;
        Ok(file.bios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_read_jsonl_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "refs.jsonl", "{\"doc_id\":\"D1\",\"refs\":[]}\n\n  \n{\"doc_id\":\"D2\",\"refs\":[]}\r\n");

        let records: Vec<BibleRefRecord> = read_jsonl(&dir.path().join("refs.jsonl")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].doc_id, "D2");
    }

    #[test]
    fn test_read_jsonl_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "refs.jsonl", "{\"doc_id\":\"D1\"}\n{broken\n");

        let err = read_jsonl::<BibleRefRecord>(&dir.path().join("refs.jsonl")).unwrap_err();
        assert!(matches!(err, SourceError::JsonLine { line: 2, .. }));
    }

    #[test]
    fn test_bible_refs_fall_back_to_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "data_processing/output/bible_refs.jsonl",
            "{\"doc_id\":\"D1\",\"refs\":[{\"book\":\"Gen\",\"osis\":\"Gen.1.1\"}]}\n",
        );
        let source = FsCorpusSource::new(ProjectLayout::new(dir.path()));
        assert_eq!(source.bible_refs().unwrap()[0].refs[0].osis, "Gen.1.1");

        write(
            dir.path(),
            "src/lib/data/aco-bible-refs.json",
            r#"{"bibleRefs":[{"doc_id":"P1","refs":[]}],"meta":{}}"#,
        );
        assert_eq!(source.bible_refs().unwrap()[0].doc_id, "P1");
    }

    #[test]
    fn test_null_ids_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "data_processing/output/bible_refs.jsonl",
            concat!(
                "{\"doc_id\":\"D1\",\"refs\":[{\"book\":\"Gen\",\"osis\":\"Gen.1.1\"},{\"book\":\"Gen\",\"osis\":null}]}\n",
                "{\"doc_id\":null,\"refs\":[{\"book\":\"Rom\",\"osis\":\"Rom.8.28\"}]}\n",
            ),
        );
        let source = FsCorpusSource::new(ProjectLayout::new(dir.path()));
        let records = source.bible_refs().unwrap();
        assert_eq!(records.len(), 2);

        let page = crate::atlas::build_bible_index(
            &records,
            &crate::types::DocumentIndex::default(),
            &crate::OsisNormalizer::default(),
        );
        assert!(page.new_testament.is_empty());
        assert_eq!(page.old_testament.len(), 1);
        assert_eq!(page.old_testament[0].refs.len(), 1);
        assert_eq!(page.old_testament[0].refs[0].count, 1);
    }

    #[test]
    fn test_missing_metadata_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsCorpusSource::new(ProjectLayout::new(dir.path()));
        assert!(source.documents().unwrap_err().is_not_found());
    }
}
